/// Track state enumeration for the SORT track lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Matched recently but not yet for `min_hits` consecutive frames
    #[default]
    Tentative,
    /// Matched for at least `min_hits` consecutive frames
    Confirmed,
    /// Missed in the latest frame, kept alive for up to `max_age` frames
    Lost,
}
