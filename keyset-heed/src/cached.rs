use keyset::domain::{ContentModel, WatchingSession};
use keyset::Id;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A row type stored in the cache as JSON.
pub trait Cached: Serialize + DeserializeOwned {
    const NAMESPACE: &'static [u8];

    /// Key range the row is listed under.
    fn partition(&self) -> Id;

    fn id(&self) -> Id;

    fn set_id(&mut self, id: Id);
}

impl Cached for ContentModel {
    const NAMESPACE: &'static [u8] = b"content";

    fn partition(&self) -> Id {
        0
    }

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }
}

/// Sessions are listed per watched content.
impl Cached for WatchingSession {
    const NAMESPACE: &'static [u8] = b"watching";

    fn partition(&self) -> Id {
        self.content_id
    }

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }
}
