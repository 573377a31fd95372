use crate::model::Track;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

const TITLE_DECORATIONS: [&str; 20] = [
    "(Official Video)",
    "(Official Music Video)",
    "(Official Audio)",
    "[Official Video]",
    "[Official Music Video]",
    "[Official Audio]",
    "(Audio)",
    "[Audio]",
    "(Lyrics)",
    "[Lyrics]",
    "(Official Lyric Video)",
    "[Official Lyric Video]",
    "(Official Visualizer)",
    "[Official Visualizer]",
    "(Official)",
    "[Official]",
    "(HD)",
    "[HD]",
    "(HQ)",
    "[HQ]",
];

const TITLE_SEPARATORS: [&str; 6] = [" - ", " – ", " — ", " | ", " // ", " ~ "];

// Alternate renditions never beat the original recording in a search.
const SKIP_KEYWORDS: [&str; 16] = [
    "cover",
    "karaoke",
    "instrumental",
    "remix",
    "live",
    "concert",
    "reaction",
    "tutorial",
    "acoustic",
    "piano version",
    "guitar version",
    "drum cover",
    "extended",
    "mashup",
    "medley",
    "tribute",
];

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search failed with status {0}")]
    Status(StatusCode),
    #[error("search response could not be parsed: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

pub(crate) trait Search {
    async fn search(&self, query: &str) -> Result<Option<Track>, Error>;
}

/// Asks the backend's search endpoint for candidates and picks the best
/// match for the query.
pub(crate) struct BackendSearcher {
    http_client: reqwest::Client,
    base_url: String,
}

impl BackendSearcher {
    pub(crate) fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

impl Search for BackendSearcher {
    async fn search(&self, query: &str) -> Result<Option<Track>, Error> {
        let url = format!("{}/youtube/search", self.base_url);
        let response = self
            .http_client
            .get(url)
            .query(&[("q", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }

        let payload: SearchResponse = serde_json::from_str(&response.text().await?)?;
        Ok(best_match(query, &payload.items))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: ItemId,
    snippet: Snippet,
}

#[derive(Deserialize, Default)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

fn best_match(query: &str, items: &[SearchItem]) -> Option<Track> {
    let query_clean = clean_for_comparison(query);
    let query_words: HashSet<&str> = query_clean.split_whitespace().collect();

    let mut best: Option<(i32, Track)> = None;
    for item in items {
        let Some(video_id) = item.id.video_id.as_ref() else {
            continue;
        };
        let title = &item.snippet.title;
        let channel = &item.snippet.channel_title;

        let title_lowered = title.to_lowercase();
        if SKIP_KEYWORDS
            .iter()
            .any(|keyword| title_lowered.contains(keyword))
        {
            continue;
        }

        let (song, artist) = parse_title(title, channel);
        if !is_official_channel(channel, artist.as_deref()) {
            continue;
        }
        let artist = artist.unwrap_or_else(|| channel.clone());

        let song_clean = clean_for_comparison(&song);
        let score = score_candidate(
            &query_clean,
            &query_words,
            &song_clean,
            channel,
            &title_lowered,
        );

        if best
            .as_ref()
            .is_none_or(|(best_score, _)| score > *best_score)
        {
            let thumbnail_url = item
                .snippet
                .thumbnails
                .medium
                .as_ref()
                .map(|thumbnail| thumbnail.url.clone());
            best = Some((
                score,
                Track::new(video_id.clone(), clean_title(title), artist, thumbnail_url),
            ));
        }
    }

    best.map(|(_, track)| track)
}

fn score_candidate(
    query_clean: &str,
    query_words: &HashSet<&str>,
    song_clean: &str,
    channel: &str,
    title_lowered: &str,
) -> i32 {
    if song_clean == query_clean {
        return 100;
    }

    let song_words: HashSet<&str> = song_clean.split_whitespace().collect();
    let mut score = (query_words.intersection(&song_words).count() * 10) as i32;

    if song_clean.contains(query_clean) || query_clean.contains(song_clean) {
        score += 20;
    }

    let channel_lowered = channel.to_lowercase();
    if channel_lowered.contains("vevo") {
        score += 15;
    } else if channel_lowered.contains("official") {
        score += 10;
    }

    if title_lowered.contains("official audio") {
        score += 5;
    } else if title_lowered.contains("official music video") {
        score += 3;
    }

    score
}

/// Strips `(Official Video)`-style decorations from a display title.
pub(crate) fn clean_title(title: &str) -> String {
    let mut title = title.to_owned();
    for decoration in TITLE_DECORATIONS {
        title = title.replace(decoration, "");
    }
    title.trim().to_owned()
}

/// Splits a video title into `(song, artist)`. The channel name decides
/// which side of an `Artist - Song` separator is which; without a separator
/// the channel doubles as the artist when the title mentions it.
fn parse_title(title: &str, channel: &str) -> (String, Option<String>) {
    if channel.is_empty() {
        return (title.to_owned(), None);
    }
    let channel_lowered = channel.to_lowercase();

    for separator in TITLE_SEPARATORS {
        if let Some((left, right)) = title.split_once(separator) {
            let (left, right) = (left.trim(), right.trim());
            let swapped = right.to_lowercase().contains(&channel_lowered)
                && !left.to_lowercase().contains(&channel_lowered);
            return if swapped {
                (left.to_owned(), Some(right.to_owned()))
            } else {
                (right.to_owned(), Some(left.to_owned()))
            };
        }
    }

    if title.to_lowercase().contains(&channel_lowered) {
        let song = title.replace(channel, "").trim().to_owned();
        return (song, Some(channel.to_owned()));
    }

    (title.to_owned(), None)
}

fn is_official_channel(channel: &str, artist: Option<&str>) -> bool {
    let channel_lowered = channel.to_lowercase();

    if channel_lowered.contains("vevo") || channel_lowered.contains("official") {
        return true;
    }
    if ["records", "music", "entertainment", "label", "studio"]
        .iter()
        .any(|keyword| channel_lowered.contains(keyword))
    {
        return true;
    }

    if let Some(artist) = artist {
        let artist_clean = clean_for_comparison(artist);
        let channel_clean = clean_for_comparison(channel);
        if !artist_clean.is_empty()
            && (channel_clean.contains(&artist_clean) || artist_clean.contains(&channel_clean))
        {
            return true;
        }
    }

    false
}

fn clean_for_comparison(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|character| character.is_alphanumeric() || character.is_whitespace())
        .collect::<String>()
        .trim()
        .to_owned()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn item(video_id: &str, title: &str, channel: &str) -> SearchItem {
        SearchItem {
            id: ItemId {
                video_id: Some(video_id.to_owned()),
            },
            snippet: Snippet {
                title: title.to_owned(),
                channel_title: channel.to_owned(),
                thumbnails: Thumbnails::default(),
            },
        }
    }

    #[test]
    fn clean_title_strips_decorations() {
        assert_eq!(
            clean_title("Daft Punk - One More Time (Official Video)"),
            "Daft Punk - One More Time"
        );
        assert_eq!(clean_title("Plain Title"), "Plain Title");
    }

    #[test]
    fn parse_title_splits_artist_and_song() {
        let (song, artist) = parse_title("Daft Punk - One More Time", "Daft Punk Official");
        assert_eq!(song, "One More Time");
        assert_eq!(artist.as_deref(), Some("Daft Punk"));
    }

    #[test]
    fn parse_title_swaps_when_the_channel_sits_on_the_right() {
        let (song, artist) = parse_title("One More Time - Daft Punk", "Daft Punk");
        assert_eq!(song, "One More Time");
        assert_eq!(artist.as_deref(), Some("Daft Punk"));
    }

    #[test]
    fn parse_title_falls_back_to_the_channel_as_artist() {
        let (song, artist) = parse_title("Daft Punk One More Time", "Daft Punk");
        assert_eq!(song, "One More Time");
        assert_eq!(artist.as_deref(), Some("Daft Punk"));
    }

    #[test]
    fn parse_title_without_any_hint_keeps_the_title() {
        let (song, artist) = parse_title("One More Time", "Some Channel");
        assert_eq!(song, "One More Time");
        assert_eq!(artist, None);
    }

    #[test]
    fn official_channels_are_recognized() {
        assert!(is_official_channel("DaftPunkVEVO", None));
        assert!(is_official_channel("Daft Punk Official", None));
        assert!(is_official_channel("Parlophone Records", None));
        assert!(is_official_channel("Daft Punk", Some("Daft Punk")));
        assert!(!is_official_channel("random uploads", Some("Daft Punk")));
    }

    #[test]
    fn an_exact_title_match_wins() {
        let items = vec![
            item("v1", "One More Time (Live)", "DaftPunkVEVO"),
            item("v2", "One More Time (Official Audio)", "DaftPunkVEVO"),
            item("v3", "Something Else", "DaftPunkVEVO"),
        ];

        let track = best_match("one more time", &items).unwrap();
        assert_eq!(track.video_id, "v2");
        assert_eq!(track.title, "One More Time");
    }

    #[test]
    fn covers_and_karaoke_are_skipped() {
        let items = vec![
            item("v1", "One More Time (Karaoke)", "KaraokeVEVO"),
            item("v2", "One More Time cover", "Covers Official"),
        ];
        assert_eq!(best_match("one more time", &items), None);
    }

    #[test]
    fn unofficial_channels_are_skipped() {
        let items = vec![item("v1", "One More Time", "random uploads")];
        assert_eq!(best_match("one more time", &items), None);
    }

    #[test]
    fn word_overlap_beats_no_overlap() {
        let items = vec![
            item("v1", "Harder Better Faster Stronger", "DaftPunkVEVO"),
            item("v2", "Around the World", "DaftPunkVEVO"),
        ];
        let track = best_match("harder better", &items).unwrap();
        assert_eq!(track.video_id, "v1");
    }
}
