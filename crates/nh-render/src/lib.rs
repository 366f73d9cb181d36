//! Element rendering: maps document nodes to native elements through a
//! pluggable renderer registry, composes per-tag prop hooks and drives the
//! image load state machine.

mod builtin;
pub mod config;
pub mod element;
pub mod hooks;
pub mod img;
pub mod model;
mod path;
pub mod props;
pub mod registry;
pub mod session;

pub use config::AnchorProps;
pub use config::ConfiguredProps;
pub use config::ImgProps;
pub use config::RenderConfig;
pub use config::RenderConfigBuilder;
pub use config::RenderersProps;
pub use element::ContentFit;
pub use element::ImageElement;
pub use element::NativeElement;
pub use element::Surface;
pub use element::TextAlign;
pub use element::TextElement;
pub use element::ViewElement;
pub use element::ViewStyle;
pub use hooks::HookContext;
pub use img::ImageLoadState;
pub use img::ImageSource;
pub use img::ImgSnapshot;
pub use img::ManualImageSource;
pub use model::Capability;
pub use model::ContentModel;
pub use model::RendererModel;
pub use path::NodePath;
pub use props::PressEvent;
pub use props::PressHandler;
pub use props::PropsPatch;
pub use props::TagProps;
pub use registry::RendererRegistry;
pub use registry::RendererRegistryBuilder;
pub use session::RenderContext;
pub use session::RenderSession;
pub use nh_layout::MaxWidth;
pub use nh_layout::MaxWidthPolicy;
pub use nh_layout::NoScaling;
pub use nh_layout::Size;
