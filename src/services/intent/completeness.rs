use super::markup::{FENCE_CLOSE, FENCE_OPEN, TAG_CLOSE, TAG_OPEN};

/// Whether `text` is safe to extract from: no fenced opener is missing its
/// closing fence and the tag delimiters balance.
pub fn is_card_intent_complete(text: &str) -> bool {
    fences_closed(text) && tags_balanced(text)
}

fn fences_closed(text: &str) -> bool {
    text.match_indices(FENCE_OPEN)
        .all(|(at, open)| text[at + open.len()..].contains(FENCE_CLOSE))
}

fn tags_balanced(text: &str) -> bool {
    let mut events: Vec<(usize, i32)> = text
        .match_indices(TAG_OPEN)
        .map(|(at, _)| (at, 1))
        .chain(text.match_indices(TAG_CLOSE).map(|(at, _)| (at, -1)))
        .collect();
    events.sort_unstable_by_key(|(at, _)| *at);

    let mut depth = 0;
    for (_, delta) in events {
        depth += delta;
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}
