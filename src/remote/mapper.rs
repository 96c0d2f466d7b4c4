//! Maps a remote feed response into [`FeedImage`] values

use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::RemoteFeedError;
use crate::feed::FeedImage;

/// The only status code accepted from the feed endpoint
const OK_200: u16 = 200;

#[derive(Debug, Deserialize)]
struct Root {
    items: Vec<RemoteFeedItem>,
}

#[derive(Debug, Deserialize)]
struct RemoteFeedItem {
    id: Uuid,
    description: Option<String>,
    location: Option<String>,
    image: Url,
}

impl From<RemoteFeedItem> for FeedImage {
    fn from(item: RemoteFeedItem) -> Self {
        Self {
            id: item.id,
            description: item.description,
            location: item.location,
            url: item.image,
        }
    }
}

/// Decodes `data` received with `status`
///
/// Anything other than a 200 response with a well-formed `items` payload is
/// [`RemoteFeedError::InvalidData`].
pub fn map(data: &[u8], status: u16) -> Result<Vec<FeedImage>, RemoteFeedError> {
    if status != OK_200 {
        return Err(RemoteFeedError::InvalidData);
    }

    let root: Root = serde_json::from_slice(data).map_err(|_| RemoteFeedError::InvalidData)?;
    Ok(root.items.into_iter().map(FeedImage::from).collect())
}
