//! Data model types.

pub mod controller;
pub mod device;
pub mod endpoint;
pub mod speed;
pub mod status;
pub mod topology;

pub use controller::ControllerInfo;
pub use device::{ClassTable, DEFAULT_CLASSES, DeviceNode, DeviceRecord};
pub use endpoint::{Direction, Endpoint, TransferType};
pub use speed::UsbSpeed;
pub use status::{Status, StatusCounts};
pub use topology::{NodeShape, PathResult, PciAddress};
