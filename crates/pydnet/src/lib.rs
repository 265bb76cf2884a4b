#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use pydnet_image as image;

#[doc(inline)]
pub use pydnet_imgproc as imgproc;

#[doc(inline)]
pub use pydnet_io as io;

#[doc(inline)]
pub use pydnet_eval as eval;
