pub mod buffer;
pub mod events;
pub mod key;

use self::key::Key;

pub enum InputEvent {
    /// An input event occurred.
    Input(Key),
    /// An tick event occurred.
    Tick,
}
