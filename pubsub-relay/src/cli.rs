use std::time::Duration;

use clap::Parser;
use kvgate_store::StoreAddr;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Hostname of the backing store.
    #[arg(long, env = "KVGATE_STORE_HOST", default_value = "127.0.0.1")]
    pub store_host: String,

    /// Port of the backing store.
    #[arg(long, env = "KVGATE_STORE_PORT", default_value_t = 6379)]
    pub store_port: u16,

    /// Seconds between published messages.
    #[arg(long, env = "KVGATE_PUBLISH_PERIOD", default_value_t = 5)]
    pub publish_period: u64,
}

impl Cli {
    pub fn store_addr(&self) -> StoreAddr {
        StoreAddr::new(self.store_host.clone(), self.store_port)
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.publish_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_store_deployment() {
        let cli = Cli::parse_from(["kvgate-relay"]);
        assert_eq!(cli.store_addr(), StoreAddr::new("127.0.0.1", 6379));
        assert_eq!(cli.period(), Duration::from_secs(5));
    }
}
