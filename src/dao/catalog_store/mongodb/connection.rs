use std::time::Duration;

use mongodb::{Client, Database, bson::doc, error::Error as MongoError, options::ClientOptions};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::{MongoDaoError, MongoResult};

/// Pings attempted before a connection attempt is reported as failed. The storage
/// supervisor retries whole attempts on top of this.
const PING_ATTEMPTS: u32 = 5;
const FIRST_PING_DELAY: Duration = Duration::from_millis(200);
const MAX_PING_DELAY: Duration = Duration::from_secs(3);

/// Round-trip a `ping` command to the server.
pub async fn ping(database: &Database) -> Result<(), MongoError> {
    database.run_command(doc! { "ping": 1 }).await.map(|_| ())
}

/// Build a client and wait until the server answers a ping.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut delay = FIRST_PING_DELAY;
    let mut attempt = 1;
    loop {
        match ping(&database).await {
            Ok(()) => {
                debug!(attempt, database = database_name, "MongoDB answered ping");
                return Ok((client, database));
            }
            Err(source) if attempt >= PING_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                warn!(
                    attempt,
                    wait_ms = delay.as_millis() as u64,
                    error = %err,
                    "MongoDB ping failed while connecting; retrying"
                );
                sleep(delay).await;
                delay = (delay * 2).min(MAX_PING_DELAY);
                attempt += 1;
            }
        }
    }
}
