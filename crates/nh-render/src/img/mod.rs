//! Image element: load state machine, resource source and the building
//! blocks custom renderers compose.

pub mod source;
pub mod state;
pub mod store;
pub mod views;

pub use source::FetchOutcome;
pub use source::ImageListener;
pub use source::ImageSource;
pub use source::ManualImageSource;
pub use source::Subscription;
pub use state::ImageEvent;
pub use state::ImageLoadState;
pub use store::ImageStore;
pub use views::ImgSnapshot;
pub use views::img_container;
pub use views::img_error;
pub use views::img_loading;
pub use views::img_success;
