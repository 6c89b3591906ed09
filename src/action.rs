//! Actions - every key press and async result the screen reacts to

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::Button;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    /// Screen shown for the first time
    Init,
    UiTerminalResize(u16, u16),
    /// Animation clock
    Tick,

    /// One press of the fixed button vocabulary
    Press(Button),

    // ===== Sprite category =====
    SpriteDidLoad { token: u64, sprite: SpriteData },
    SpriteDidError { token: u64, error: String },

    // ===== Value category =====
    /// Deferred budget label revert fired
    ValueRevert,

    // ===== Run category =====
    /// Run start payload was handed off
    RunDidStart,
    RunStartError(String),

    Quit,
}
