// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Upper bound on the payload excerpt carried by a [`DecodeError`].
pub const FRAGMENT_LIMIT: usize = 128;

/// A node stats payload that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("node stats payload is not a JSON object (near {fragment:?})")]
    NotAnObject { fragment: String },

    #[error("malformed node stats payload at line {line}, column {column}: {message} (near {fragment:?})")]
    Malformed {
        message: String,
        line: usize,
        column: usize,
        fragment: String,
    },
}

impl DecodeError {
    pub(crate) fn not_an_object(payload: &[u8]) -> Self {
        Self::NotAnObject {
            fragment: excerpt(payload, 0),
        }
    }

    pub(crate) fn from_serde(err: &serde_json::Error, payload: &[u8]) -> Self {
        let offset = byte_offset(payload, err.line(), err.column());
        Self::Malformed {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
            fragment: excerpt(payload, offset),
        }
    }

    /// The excerpt of the offending payload.
    pub fn fragment(&self) -> &str {
        match self {
            Self::NotAnObject { fragment } | Self::Malformed { fragment, .. } => fragment,
        }
    }
}

// serde_json reports 1-based lines and columns.
fn byte_offset(payload: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        payload
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map_or(payload.len(), |(i, _)| i + 1)
    };
    (line_start + column.saturating_sub(1)).min(payload.len())
}

fn excerpt(payload: &[u8], offset: usize) -> String {
    let half = FRAGMENT_LIMIT / 2;
    let start = offset.saturating_sub(half);
    let end = (start + FRAGMENT_LIMIT).min(payload.len());
    let mut fragment = String::from_utf8_lossy(&payload[start..end]).into_owned();
    // replacement characters can push a lossy excerpt past the limit
    while fragment.len() > FRAGMENT_LIMIT {
        fragment.pop();
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_is_bounded() {
        let payload = vec![b'x'; 4096];
        let err = DecodeError::not_an_object(&payload);
        assert_eq!(err.fragment().len(), FRAGMENT_LIMIT);
    }

    #[test]
    fn test_offset_follows_lines() {
        let payload = b"{\n  \"a\": 1,\n  \"b\": ?\n}";
        let offset = byte_offset(payload, 3, 8);
        assert_eq!(payload[offset], b'?');
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        assert_eq!(byte_offset(b"{}", 9, 9), 2);
    }
}
