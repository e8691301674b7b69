//! Line-oriented rendering of a video list.

use crate::youtube::Video;
use std::io::{self, Write};

/// Format one video as a single line.
///
/// # Arguments
/// * `position` - 1-based position in the listing
/// * `video` - Video to format
///
/// # Details
/// The position is right-aligned to four columns, e.g.
/// `[  12] youtube#video 2024-01-15T10:00:00Z Title, ID: abc123 (rating: like)`.
pub fn format_line(position: usize, video: &Video) -> String {
    let mut line = format!(
        "[{:>4}] {} {} {}, ID: {}",
        position,
        video.kind,
        video.format_published(),
        video.title,
        video.id
    );
    if let Some(rating) = video.rating {
        line.push_str(&format!(" (rating: {rating})"));
    }
    line
}

/// Write every video on its own line, numbered from 1.
pub fn write_videos<W: Write>(out: &mut W, videos: &[Video]) -> io::Result<()> {
    for (index, video) in videos.iter().enumerate() {
        writeln!(out, "{}", format_line(index + 1, video))?;
    }
    out.flush()
}
