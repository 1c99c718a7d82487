use rand::{rngs::OsRng, RngCore};

/// Creates a random alphanumeric string of the provided length, used for
/// join passwords, API keys and bearer tokens.
///
/// `length` The length of the random string
pub fn random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
    abcdefghijklmnopqrstuvwxyz\
    0123456789";
    const RANGE: usize = CHARSET.len();

    let mut rand = OsRng;
    let mut output = String::with_capacity(length);

    for _ in 0..length {
        loop {
            let var = (rand.next_u32() >> (32 - 6)) as usize;
            if var < RANGE {
                output.push(char::from(CHARSET[var]));
                break;
            }
        }
    }

    output
}

#[cfg(test)]
mod test {
    use super::random_string;

    #[test]
    fn test_length() {
        let value = random_string(32);
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_uniqueness() {
        let a = random_string(32);
        let b = random_string(32);
        assert_ne!(a, b);
    }
}
