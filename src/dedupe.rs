use crate::aggregate::PostCommentSet;
use ahash::AHashSet;

/// Drop exact duplicates, keeping each id at its first position.
pub fn dedupe_ordered<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let iter = ids.into_iter();
    let mut seen: AHashSet<String> = AHashSet::with_capacity(iter.size_hint().0);
    let mut out = Vec::with_capacity(iter.size_hint().0);
    for id in iter {
        if !seen.contains(&id) {
            seen.insert(id.clone());
            out.push(id);
        }
    }
    out
}

/// Deduplicate every post's list. Post order is unchanged.
pub fn dedupe_posts(posts: PostCommentSet) -> PostCommentSet {
    posts
        .into_iter()
        .map(|(code, ids)| {
            let before = ids.len();
            let unique = dedupe_ordered(ids);
            if unique.len() != before {
                tracing::debug!(shortcode = %code, before, after = unique.len(), "Removed duplicate comment ids");
            }
            (code, unique)
        })
        .collect()
}
