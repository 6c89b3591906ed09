//! Effects - side effects declared by the reducer

use crate::audio::Cue;
use crate::sprite::SpriteRequest;
use crate::state::RunStart;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Load the sprite for the cursored variant, replacing any in-flight load
    LoadSprite(SpriteRequest),
    CancelSpriteLoad,
    PlayCue(Cue),
    PlayCry { species_id: u16 },
    /// (Re)start the debounced budget label revert
    ScheduleValueRevert,
    CancelValueRevert,
    /// Hand the finalized party off and leave the screen
    StartRun(RunStart),
}
