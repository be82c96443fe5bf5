use firestore::FirestoreDb;

use crate::Status;

pub struct FirestoreApi {
    db: FirestoreDb,
}

impl FirestoreApi {
    pub async fn connect(project_id: &str) -> Result<Self, Status> {
        Ok(FirestoreApi {
            db: FirestoreDb::new(project_id).await?,
        })
    }

    pub fn db(&self) -> &FirestoreDb {
        &self.db
    }
}
