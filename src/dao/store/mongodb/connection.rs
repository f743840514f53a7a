//! Client bootstrap with a bounded ping loop.
//!
//! A freshly started MongoDB container can take a few seconds before it
//! answers commands, so the first ping is retried with exponential
//! backoff instead of failing the whole startup on the first refusal.

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;

use super::error::{MongoDaoError, MongoResult};

const PING_ATTEMPTS: u32 = 10;
const FIRST_BACKOFF: Duration = Duration::from_millis(250);
const BACKOFF_CEILING: Duration = Duration::from_secs(5);

/// Build a client for `options` and wait until `database_name` answers a
/// ping, backing off between attempts.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    wait_for_ping(&database).await?;

    Ok((client, database))
}

async fn wait_for_ping(database: &Database) -> MongoResult<()> {
    let mut backoff = FIRST_BACKOFF;
    let mut attempt = 0;

    loop {
        attempt += 1;
        let source = match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok(()),
            Err(source) => source,
        };
        if attempt >= PING_ATTEMPTS {
            return Err(MongoDaoError::InitialPing {
                attempts: attempt,
                source,
            });
        }
        sleep(backoff).await;
        backoff = (backoff * 2).min(BACKOFF_CEILING);
    }
}
