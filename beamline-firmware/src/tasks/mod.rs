//! Embassy async tasks
//!
//! Each task runs independently and communicates via the shared point
//! buffer, signals, and the renderer state flags.

pub mod idn;
pub mod iwp;
pub mod net;
pub mod render;
pub mod sd_stream;
pub mod tick;

pub use idn::idn_task;
pub use iwp::iwp_task;
pub use net::{ethernet_task, net_task};
pub use render::{render_task, BoardDac};
pub use sd_stream::sd_stream_task;
pub use tick::tick_task;
