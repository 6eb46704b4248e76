pub mod hit;
pub mod overlay;

pub use hit::{PATH_HIT_MARGIN, hit_test, hit_test_with_margin};
pub use overlay::{HandleKind, HandleLayout, PathMarker, PathPart};
