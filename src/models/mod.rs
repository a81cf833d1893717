pub mod observation;
pub mod series;
pub mod timeline;

pub use observation::*;
pub use series::*;
pub use timeline::*;
