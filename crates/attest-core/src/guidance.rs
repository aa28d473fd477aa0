//! Tiered guidance text shown to the user during a session.

/// Prompt shown while plenty of time remains.
pub const PROMPT_HOLD_STEADY: &str = "Face the camera and slowly open and close your mouth";
/// Prompt for the final seconds of the budget.
pub const PROMPT_HURRY: &str = "Almost out of time — keep your face inside the frame";
/// Shown when the budget is exhausted.
pub const PROMPT_TIMED_OUT: &str = "Verification timed out, please try again";
/// Shown once a batch matched.
pub const PROMPT_MATCHED: &str = "Verified!";

/// Urgency threshold in whole seconds.
const HURRY_BELOW_SECS: u64 = 5;

/// Pick the countdown-driven prompt for the remaining budget.
pub fn for_remaining(remaining_secs: u64) -> &'static str {
    if remaining_secs == 0 {
        PROMPT_TIMED_OUT
    } else if remaining_secs <= HURRY_BELOW_SECS {
        PROMPT_HURRY
    } else {
        PROMPT_HOLD_STEADY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_tier_above_threshold() {
        assert_eq!(for_remaining(60), PROMPT_HOLD_STEADY);
        assert_eq!(for_remaining(6), PROMPT_HOLD_STEADY);
    }

    #[test]
    fn test_urgent_tier_at_threshold_and_below() {
        assert_eq!(for_remaining(5), PROMPT_HURRY);
        assert_eq!(for_remaining(1), PROMPT_HURRY);
    }

    #[test]
    fn test_timeout_tier_at_zero() {
        assert_eq!(for_remaining(0), PROMPT_TIMED_OUT);
    }
}
