//! Canonical command order.

use std::cmp::Ordering;

use crate::command::{decode_code, decode_id};
use crate::table::{command_type, CommandType};

/// Compares the command records at offsets `a` and `b` of `buf`.
///
/// Order: category (undefined, ship, planet, base, other), then object id,
/// then code. `Other` commands carry no object and compare by code only.
#[must_use]
pub fn compare_commands(buf: &[u8], a: usize, b: usize) -> Ordering {
    let (code_a, code_b) = (decode_code(buf, a), decode_code(buf, b));
    let (type_a, type_b) = (command_type(code_a), command_type(code_b));
    type_a.cmp(&type_b).then_with(|| {
        if type_a == CommandType::Other {
            code_a.cmp(&code_b)
        } else {
            decode_id(buf, a)
                .cmp(&decode_id(buf, b))
                .then(code_a.cmp(&code_b))
        }
    })
}

/// Stable-sorts `offsets` into canonical command order.
pub fn sort_offsets(buf: &[u8], offsets: &mut [usize]) {
    offsets.sort_by(|&a, &b| compare_commands(buf, a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::encode_command;
    use crate::table::{base, other, planet, ship};

    fn arena(commands: &[(u16, u16)]) -> (Vec<u8>, Vec<usize>) {
        let mut buf = Vec::new();
        let mut offsets = Vec::new();
        for &(code, id) in commands {
            offsets.push(buf.len());
            buf.extend(encode_command(code, id, &[]));
        }
        (buf, offsets)
    }

    fn codes_ids(buf: &[u8], offsets: &[usize]) -> Vec<(u16, u16)> {
        offsets
            .iter()
            .map(|&o| (decode_code(buf, o), decode_id(buf, o)))
            .collect()
    }

    #[test]
    fn categories_before_ids() {
        let (buf, mut offsets) = arena(&[
            (other::CHANGE_PASSWORD, 0),
            (base::CHANGE_MISSION, 1),
            (planet::BUILD_BASE, 2),
            (ship::CHANGE_SPEED, 300),
        ]);
        sort_offsets(&buf, &mut offsets);
        assert_eq!(
            codes_ids(&buf, &offsets),
            vec![
                (ship::CHANGE_SPEED, 300),
                (planet::BUILD_BASE, 2),
                (base::CHANGE_MISSION, 1),
                (other::CHANGE_PASSWORD, 0),
            ]
        );
    }

    #[test]
    fn ids_then_codes_within_category() {
        let (buf, mut offsets) = arena(&[
            (ship::CHANGE_MISSION, 7),
            (ship::CHANGE_SPEED, 7),
            (ship::CHANGE_MISSION, 5),
        ]);
        sort_offsets(&buf, &mut offsets);
        assert_eq!(
            codes_ids(&buf, &offsets),
            vec![
                (ship::CHANGE_MISSION, 5),
                (ship::CHANGE_SPEED, 7),
                (ship::CHANGE_MISSION, 7),
            ]
        );
    }

    #[test]
    fn other_commands_ignore_id() {
        let (buf, _) = arena(&[(other::SEND_MESSAGE, 90), (other::SEND_MESSAGE, 10)]);
        assert_eq!(compare_commands(&buf, 0, 4), Ordering::Equal);
    }

    #[test]
    fn sort_is_stable() {
        let (buf, mut offsets) = arena(&[
            (other::SEND_MESSAGE, 9),
            (other::SEND_MESSAGE, 1),
            (other::SEND_MESSAGE, 5),
        ]);
        let before = offsets.clone();
        sort_offsets(&buf, &mut offsets);
        assert_eq!(offsets, before);
    }

    #[test]
    fn undefined_sorts_first() {
        let (buf, mut offsets) = arena(&[(ship::CHANGE_FC, 1), (0, 50)]);
        sort_offsets(&buf, &mut offsets);
        assert_eq!(codes_ids(&buf, &offsets)[0], (0, 50));
    }
}
