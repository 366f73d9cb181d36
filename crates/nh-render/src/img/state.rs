//! Load state of one image instance as a plain reducer.

use nh_layout::Size;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageLoadState {
    Idle,
    Loading,
    Success { natural: Size },
    Error { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageEvent {
    /// A source is present and a fetch has been requested.
    Start,
    Loaded { natural: Size },
    Failed { reason: String },
    /// The resolved source changed; the instance starts over.
    SourceChanged,
}

impl ImageLoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    /// Next state for `event`, or `None` when the event does not apply in
    /// the current state. Only a source change leaves a terminal state.
    pub fn transition(&self, event: ImageEvent) -> Option<Self> {
        match (self, event) {
            (_, ImageEvent::SourceChanged) => Some(Self::Idle),
            (Self::Idle, ImageEvent::Start) => Some(Self::Loading),
            (Self::Loading, ImageEvent::Loaded { natural }) => Some(Self::Success { natural }),
            (Self::Loading, ImageEvent::Failed { reason }) => Some(Self::Error { reason }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ImageEvent;
    use super::ImageLoadState;
    use nh_layout::Size;

    #[test]
    fn happy_path_reaches_success() {
        let loading = ImageLoadState::Idle.transition(ImageEvent::Start);
        assert_eq!(loading, Some(ImageLoadState::Loading));

        let natural = Size::new(40.0, 20.0);
        let done = ImageLoadState::Loading.transition(ImageEvent::Loaded { natural });
        assert_eq!(done, Some(ImageLoadState::Success { natural }));
    }

    #[test]
    fn terminal_states_only_leave_on_source_change() {
        let failed = ImageLoadState::Error {
            reason: "offline".to_owned(),
        };
        assert!(failed.is_terminal());
        assert_eq!(failed.transition(ImageEvent::Start), None);
        assert_eq!(
            failed.transition(ImageEvent::Loaded {
                natural: Size::new(1.0, 1.0)
            }),
            None
        );
        assert_eq!(
            failed.transition(ImageEvent::SourceChanged),
            Some(ImageLoadState::Idle)
        );
    }

    #[test]
    fn idle_ignores_fetch_results() {
        assert_eq!(
            ImageLoadState::Idle.transition(ImageEvent::Failed {
                reason: "late".to_owned()
            }),
            None
        );
    }
}
