//! Registration key encoding and turn-number fingerprint.
//!
//! The DOS trailer carries the raw key words. The Windows trailer carries
//! two display lines as cipher/pad pairs and a fingerprint of the turn
//! number derived from [`MAGIC_NUMBERS`]. All randomness comes from a
//! linear congruential generator seeded with the player and turn number,
//! so the same inputs always produce the same trailer bytes.

use wire::{EncodedString, WindowsTrailer, KEY_WORDS, REG_STRING_COUNT, REG_STRING_SIZE};

use crate::charset::Charset;

/// Linear congruential generator used by the host software.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prng {
    seed: u32,
}

impl Prng {
    /// Creates a generator with the given seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Creates the generator used for a player's turn.
    #[must_use]
    pub fn for_turn(player_id: i16, turn_nr: u16) -> Self {
        Self::new((player_id as u32).wrapping_add(u32::from(turn_nr) << 16))
    }

    /// Advances the state and returns its high 16 bits.
    pub fn next_u16(&mut self) -> u16 {
        self.seed = self.seed.wrapping_mul(134_775_813).wrapping_add(1);
        (self.seed >> 16) as u16
    }

    /// Returns a value in `0..limit`.
    pub fn next_below(&mut self, limit: u16) -> u16 {
        ((u32::from(self.next_u16()) * u32::from(limit)) >> 16) as u16
    }

    /// Returns a random byte.
    pub fn next_byte(&mut self) -> u8 {
        self.next_below(256) as u8
    }

    /// Returns a 31-bit value built from two draws.
    pub fn next_u31(&mut self) -> u32 {
        let high = u32::from(self.next_u16());
        let low = u32::from(self.next_u16());
        ((high << 16) | low) & 0x7FFF_FFFF
    }
}

/// Fingerprints of turn numbers 256 (index 0) and 1..=255.
///
/// Placeholder table, not the host's. Turn numbers are only recoverable
/// from trailers written by this crate until the host values replace it.
pub static MAGIC_NUMBERS: [u32; 256] = [
    1614151659, 1661573761,  728080042, 1352995524, 1501765267,   24567705,
    1810009666,  346867099,  263769817, 1364008741,  488149252, 1325321461,
    1224310543,  350528296, 1738569542, 1702036022,   37932087, 1801357808,
     228246803, 1840660175, 1455875797, 1494083802, 2065244233,  426414905,
    1485609796, 1280935844,  945364416,  847696244,  411985399,   61156114,
    1354651731, 1165175332,  960741368,  729572625,  914805909, 2122184836,
     203508850, 1902685147, 1699266616, 1715765525, 1423604709,   97749799,
     222885167, 1668817043,   56456567, 1633809885, 2066341709,  763374903,
     740904180,  539128476, 1164174222, 1701832407, 1421136296,   89264520,
    1655969750,   24707175, 1745335649,  438866046,  297269366,  278060356,
     732640395, 1013936183, 1459720118, 1608487011,  675863314, 2019600074,
    2140948143,  840095133,   62355985,  731699995,  678323094,  384590597,
    1161848542,  574599834,   94025643, 1760028924, 1202544049, 1691362285,
     401674294,  701688887, 2086624041, 1576461141, 2067619216,  752005260,
    1267750187, 1169451392, 2133616467, 1160870741,  866769850,  160570523,
    1037605996, 2073814839,  933752254, 1484192361, 1719608111, 1875765981,
    1084266317,   72023734,  271524835,  378762064, 1928203032, 1702345753,
    2007285070, 1984552574,  980233757, 1928318822,  208281161, 1736516152,
     995195932, 1060043998,  571478725,  481302671, 1077088048, 1790861102,
    1399847362,  209301295, 1651909116, 2088450921, 1202788838, 1140552004,
     933779653, 1997385012,  566051732, 1682932144,  168944375,  263861902,
     827456227,  154910458,   78565129, 1579554310,  124499346,  430204603,
    1879921298,  422183962, 1232322180,  521275413, 1551791781, 1071105967,
    1732399357,   67953575, 1581440458, 1228504501, 1647180723,  339747867,
     685002630,  107644827, 1392816645, 1969430562,  906093148,  526616300,
    1560147529,  744817353,  756190920, 1319701765,  311831186,  344672322,
      68609247,  892798872, 1676082971,  875734276, 1589054789,  853396642,
     269298352,  248131202,  647076364, 1813934592,  123082482, 2080500892,
    2134043399, 1542951045,  637241492, 1488806099, 1529818167, 1237175343,
     801397675, 2050966811, 1225139804,  598350135, 1941887428,  677794522,
    1365085836, 1347287050,  289742962, 1483622601,  266180607, 1991953209,
    1471660714, 2047161026,  540429400, 1639964155, 2021932936, 2133748298,
     821292135, 1121162794,  305555797,  976745733, 1650365236, 1757587939,
     386250191, 1602999401,  814828760,  449794312,  141792233,  613129922,
    1812577163, 2125331062,  819424722,  903519896,  209451425,  497760525,
     588769993, 1728927055,  718654379,  822359800, 1774700978, 1447798265,
    1267767632,  568432339,  586406459, 1361231067, 1243143679,   42645416,
     525695235, 1465274308, 2104358793, 2050639750, 1397302994, 1590310673,
    1854239730, 1747814696, 1325267252,  637907733,  467130519, 2079819286,
     257553307, 1563434437, 1101337432,  804508512,   78529739, 1011787072,
     984737167,  488657506,  807286930, 1529521388,  607556884,  447271029,
     160640866,  536569061, 2089355121, 1166457490, 1805581232, 1335829017,
    1467664423,  529811592, 1230715355,  799909168,
];

/// Display line of a registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLine {
    /// Registered player name.
    Name,
    /// Registered player address.
    Address,
    /// Free-form third line.
    Extra1,
    /// Free-form fourth line.
    Extra2,
}

/// A registration key as seen by the turn codec.
pub trait RegistrationKey {
    /// Returns one display line.
    fn line(&self, which: KeyLine) -> String;

    /// Returns the raw key words stored in the DOS trailer.
    fn key_words(&self) -> [u32; KEY_WORDS];
}

/// Registration key held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRegistrationKey {
    pub lines: [String; 4],
    pub words: [u32; KEY_WORDS],
}

impl StaticRegistrationKey {
    /// Key of an unregistered installation.
    #[must_use]
    pub fn unregistered() -> Self {
        Self {
            lines: [
                "Unregistered".to_string(),
                "Version 3.5".to_string(),
                String::new(),
                String::new(),
            ],
            words: [0; KEY_WORDS],
        }
    }
}

impl RegistrationKey for StaticRegistrationKey {
    fn line(&self, which: KeyLine) -> String {
        let index = match which {
            KeyLine::Name => 0,
            KeyLine::Address => 1,
            KeyLine::Extra1 => 2,
            KeyLine::Extra2 => 3,
        };
        self.lines[index].clone()
    }

    fn key_words(&self) -> [u32; KEY_WORDS] {
        self.words
    }
}

/// Trailer fields produced by [`encode_registration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedRegistration {
    /// Words for the DOS trailer.
    pub key_words: [u32; KEY_WORDS],
    /// Windows trailer fields, when the Winplan feature is active.
    pub windows: Option<WindowsFields>,
}

/// Windows trailer fields derived from a registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsFields {
    pub vph_key: [u32; 2],
    pub reg_strings: [EncodedString; REG_STRING_COUNT],
}

impl WindowsFields {
    /// Copies the fields into a trailer, keeping its version.
    pub fn apply(&self, trailer: &mut WindowsTrailer) {
        trailer.vph_key = self.vph_key;
        trailer.reg_strings = self.reg_strings;
    }
}

/// Encodes a registration key for a player's turn.
///
/// Only the name and address lines are written; string slots 2 and 3 stay
/// zero.
pub fn encode_registration(
    key: &dyn RegistrationKey,
    charset: &dyn Charset,
    player_id: i16,
    turn_nr: u16,
    winplan: bool,
) -> EncodedRegistration {
    let key_words = key.key_words();
    if !winplan {
        return EncodedRegistration {
            key_words,
            windows: None,
        };
    }

    let mut rng = Prng::for_turn(player_id, turn_nr);
    let mut reg_strings = [EncodedString::default(); REG_STRING_COUNT];
    for (slot, which) in reg_strings.iter_mut().zip([KeyLine::Name, KeyLine::Address]) {
        *slot = encode_string(&charset.encode(&key.line(which)), &mut rng);
    }

    let random = rng.next_u31();
    let magic = MAGIC_NUMBERS[usize::from(turn_nr) % MAGIC_NUMBERS.len()];
    EncodedRegistration {
        key_words,
        windows: Some(WindowsFields {
            vph_key: [magic ^ random, random],
            reg_strings,
        }),
    }
}

fn encode_string(plain: &[u8], rng: &mut Prng) -> EncodedString {
    let mut out = EncodedString::default();
    for i in 0..REG_STRING_SIZE {
        let byte = plain.get(i).copied().unwrap_or(0);
        let pad = rng.next_byte();
        out.cipher[i] = byte ^ pad;
        out.pad[i] = pad;
    }
    out
}

/// Decodes one registration string of a Windows trailer.
///
/// Returns an empty string for slots out of range.
#[must_use]
pub fn decode_registration_line(
    trailer: &WindowsTrailer,
    slot: usize,
    charset: &dyn Charset,
) -> String {
    let Some(encoded) = trailer.reg_strings.get(slot) else {
        return String::new();
    };
    let plain = encoded.plain();
    let end = plain.iter().position(|&b| b == 0).unwrap_or(plain.len());
    charset.decode(&plain[..end])
}

/// Recovers the turn number a Windows trailer was generated for.
#[must_use]
pub fn try_recover_turn_number(trailer: &WindowsTrailer) -> Option<u16> {
    let fingerprint = (trailer.vph_key[0] ^ trailer.vph_key[1]) & 0x7FFF_FFFF;
    MAGIC_NUMBERS
        .iter()
        .position(|&magic| magic == fingerprint)
        .map(|index| if index == 0 { 256 } else { index as u16 })
}
