//! Known command ids.
//!
//! Fire-and-forget commands are written without registering for a response.

/// Set one or more digit positions (fire-and-forget).
pub const SET_DIGIT_POSITIONS: u8 = 0x06;

/// Move the hand into a predefined grip (fire-and-forget).
pub const SET_GRIP: u8 = 0x07;

/// Query relative humidity inside the hand (request/response, f32 percent).
pub const GET_RELATIVE_HUMIDITY: u8 = 0x0A;

/// Returns a human-readable name for a command id.
pub fn command_name(id: u8) -> &'static str {
    match id {
        SET_DIGIT_POSITIONS => "SET_DIGIT_POSITIONS",
        SET_GRIP => "SET_GRIP",
        GET_RELATIVE_HUMIDITY => "GET_RELATIVE_HUMIDITY",
        _ => "UNKNOWN",
    }
}

/// Returns true if the command expects no response.
pub fn is_fire_and_forget(id: u8) -> bool {
    matches!(id, SET_DIGIT_POSITIONS | SET_GRIP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hand_motion_commands_skip_the_response() {
        assert!(is_fire_and_forget(SET_DIGIT_POSITIONS));
        assert!(is_fire_and_forget(SET_GRIP));
        assert!(!is_fire_and_forget(GET_RELATIVE_HUMIDITY));
        assert!(!is_fire_and_forget(0x42));
        assert_eq!(command_name(0x42), "UNKNOWN");
    }
}
