//! Namespace segment rules
//!
//! Zone keys, upstream group keys and upstream server identifiers become
//! single segments of a dotted metric path, so path delimiters inside them
//! must be neutralised.

use std::borrow::Cow;

/// Characters that may not appear inside a single segment
const UNSAFE_SEGMENT_CHARS: [char; 3] = [':', '.', '/'];

/// Catch-all zone key reported by the status module
const WILDCARD_KEY: &str = "*";

/// Segment used in place of the catch-all key
const WILDCARD_SEGMENT: &str = "all";

/// Replace every `:`, `.` and `/` with `_`
pub fn sanitize_segment(raw: &str) -> Cow<'_, str> {
    if raw.contains(UNSAFE_SEGMENT_CHARS) {
        Cow::Owned(raw.replace(UNSAFE_SEGMENT_CHARS, "_"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Segment for a server-zone or upstream-group key
///
/// `*` maps to `all` before sanitization.
pub fn zone_segment(key: &str) -> Cow<'_, str> {
    if key == WILDCARD_KEY {
        Cow::Borrowed(WILDCARD_SEGMENT)
    } else {
        sanitize_segment(key)
    }
}
