#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Track {
    pub(crate) video_id: String,
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) thumbnail_url: Option<String>,
}

impl Track {
    pub(crate) fn new(
        video_id: String,
        title: String,
        artist: String,
        thumbnail_url: Option<String>,
    ) -> Self {
        Self {
            video_id,
            title,
            artist,
            thumbnail_url,
        }
    }
}
