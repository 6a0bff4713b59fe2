use rand::{distributions::Alphanumeric, Rng};

/// Random alphanumeric identifier of the given length.
pub fn generate_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
