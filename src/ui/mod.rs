pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, header, info, section, success, warn};
pub use progress::ParseProgress;
pub use table::{TableBuilder, stats_table};
pub use theme::{Theme, theme};
