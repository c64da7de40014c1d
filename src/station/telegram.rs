//! Telegram texts played by the station.

use core::fmt::Write;

use crate::dot_code::Telegram;

/// Played over and over while the selector is not on a known station.
pub const SETUP_PROMPT: &str = ".~~";

/// Period chatter played by the ambiance station.
pub static AMBIANCE_MESSAGES: [&str; 7] = [
    "THERE IS AN EMPTY BOX CAR HERE FOR NEXT TRAIN TO PICK UP.",
    "CAN WE FOLLOW FURY TO FALMOUTH FOR WATER. WE HAVE BUT 8 INCHES.",
    "RUN AN EXTRA TRAIN TO PICK UP TROOPS AT FALMOUTH.",
    "TROOPS ARE LOADED AND READY TO MOVE.",
    "DID A CAR LEAVE AQUIA LOADED WITH A TUB OF BUTTER FOR COL G A MYERS?",
    "THE DISPATCHER WILL ARRANGE A GRAVEL TRAIN FROM POTOMAC CREEK TO STONEMANS",
    "THE SWITCH LEADING TO THE ENGINE TRACK IS BEING TAKEN UP. WHEN YOU COME SEE THAT ALL IS RIGHT BEFORE PASSING OVER.",
];

/// "Train on station" report sent when a train button is pressed.
///
/// ```
/// use rs_sounder::station::telegram::dispatch;
///
/// assert_eq!(dispatch("ST", true, "1").as_str(), "WWW OS ~ST E1.~~~~");
/// assert_eq!(dispatch("FA", false, "4").as_str(), "WWW OS ~FA 4.~~~~");
/// ```
pub fn dispatch(station: &str, extra: bool, train: &str) -> Telegram {
    let mut text = Telegram::new();
    let marker = if extra { "E" } else { "" };
    let _ = write!(text, "WWW OS ~{} {}{}.~~~~", station, marker, train);
    text
}

/// Station identification played while a valid station is selected in setup.
pub fn identify(station: &str) -> Telegram {
    let mut text = Telegram::new();
    let _ = write!(text, "I AM {}.~~", station);
    text
}

/// Copy a fixed text into a telegram buffer.
pub fn fixed(text: &str) -> Telegram {
    let mut telegram = Telegram::new();
    let _ = telegram.push_str(crate::config::truncate_to(text, telegram.capacity()));
    telegram
}
