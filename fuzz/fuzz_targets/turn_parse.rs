#![no_main]

use codec::{Limits, ParseMode, TurnFile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();

    let _ = TurnFile::from_bytes(data, ParseMode::HeaderOnly, &limits);
    let Ok(mut turn) = TurnFile::from_bytes(data, ParseMode::Full, &limits) else {
        return;
    };

    // Every accessor must stay in bounds for a successfully parsed turn.
    for i in 0..turn.num_commands() {
        let _ = turn.command_data(i);
        let _ = turn.command_run_length(i);
    }
    let _ = turn.try_get_turn_nr();

    // A parsed turn re-emits, and a rebuilt one parses back.
    assert!(turn.to_bytes().is_ok());
    if turn.sort_commands().is_ok() && turn.update().is_ok() {
        let bytes = turn.to_bytes().unwrap();
        let _ = wire::TurnHeader::decode(&bytes);
        assert!(TurnFile::from_bytes(&bytes, ParseMode::Full, &Limits::unlimited()).is_ok());
    }
});
