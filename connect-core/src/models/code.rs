use nanoid::nanoid;

use super::RoomId;

/// Low-ambiguity alphabet for room codes. Excludes 0/o, 1/l/i so codes can
/// be read aloud or typed from a whiteboard without confusion.
pub const ROOM_CODE_ALPHABET: [char; 31] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'k', 'm',
    'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generate a candidate room code of the given length.
///
/// Uniqueness is enforced by the store; callers retry on collision.
#[must_use]
pub fn generate_room_code(length: usize) -> RoomId {
    RoomId(nanoid!(length, &ROOM_CODE_ALPHABET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length() {
        assert_eq!(generate_room_code(5).as_str().len(), 5);
        assert_eq!(generate_room_code(8).as_str().len(), 8);
    }

    #[test]
    fn test_code_uses_low_ambiguity_alphabet() {
        for _ in 0..100 {
            let code = generate_room_code(5);
            assert!(code.as_str().chars().all(|c| ROOM_CODE_ALPHABET.contains(&c)));
        }
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_chars() {
        for c in ['0', 'o', 'O', '1', 'l', 'i', 'I'] {
            assert!(!ROOM_CODE_ALPHABET.contains(&c));
        }
    }
}
