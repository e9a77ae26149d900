mod intent;
mod respond;

pub use intent::{interpret, Intent};
pub use respond::{respond, AssistantReply, ResponseAction};
