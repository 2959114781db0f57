//! Shared state threaded through every command handler.

use crate::auth::AuthStore;
use crate::error::AlertError;
use chrono::Utc;
use heli_engine::{
    flow_delta, scan_network_unbonding, DecoyConfig, FlowDelta, FlowSnapshot, NetworkUnbonding,
    TtlCache, WallConfig,
};
use heli_feeds::{CoinGeckoClient, FeedError, LcdClient, MexcClient};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

/// A treasury wallet tracked by the core-team report.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreWallet {
    pub address: String,
    pub note: String,
}

/// Bot configuration, loadable from a JSON file with env overrides
/// applied by the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub lcd_base: String,
    pub mexc_base: String,
    pub coingecko_base: String,
    /// Exchange pair symbol, e.g. HELIUSDT.
    pub symbol: String,
    /// Chain micro-denomination.
    pub denom: String,
    /// CoinGecko coin id for the fallback price.
    pub coingecko_id: String,
    pub admin_id: i64,
    pub auth_path: PathBuf,
    /// Seconds a network unbonding scan stays cached.
    pub scan_ttl_secs: u64,
    pub core_wallets: Vec<CoreWallet>,
    pub decoy: DecoyParams,
    pub walls: WallParams,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecoyParams {
    pub qty_threshold: f64,
    pub alert_count: usize,
    pub max_display: usize,
}

impl Default for DecoyParams {
    fn default() -> Self {
        let d = DecoyConfig::default();
        Self {
            qty_threshold: d.qty_threshold,
            alert_count: d.alert_count,
            max_display: d.max_display,
        }
    }
}

impl DecoyParams {
    pub fn to_config(&self) -> DecoyConfig {
        DecoyConfig {
            qty_threshold: self.qty_threshold,
            alert_count: self.alert_count,
            max_display: self.max_display,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WallParams {
    pub min_qty: f64,
    pub band_pct: f64,
    pub dominance: f64,
}

impl Default for WallParams {
    fn default() -> Self {
        let w = WallConfig::default();
        Self {
            min_qty: w.min_qty,
            band_pct: w.band_pct,
            dominance: w.dominance,
        }
    }
}

impl WallParams {
    pub fn to_config(&self) -> WallConfig {
        WallConfig {
            min_qty: self.min_qty,
            band_pct: self.band_pct,
            dominance: self.dominance,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            lcd_base: "https://lcd.helichain.com".to_string(),
            mexc_base: "https://api.mexc.com/api/v3".to_string(),
            coingecko_base: "https://api.coingecko.com/api/v3".to_string(),
            symbol: "HELIUSDT".to_string(),
            denom: "uheli".to_string(),
            coingecko_id: "heli".to_string(),
            admin_id: 0,
            auth_path: PathBuf::from("heli_auth.json"),
            scan_ttl_secs: 30,
            core_wallets: vec![
                CoreWallet {
                    address: "heli1ve27kkz6t8st902a6x4tz9fe56j6c87w92vare".to_string(),
                    note: "Incentive ecosystem".to_string(),
                },
                CoreWallet {
                    address: "heli1vzu8p83d2l0rswtllpqdelj4dewlty6r4kjfwa".to_string(),
                    note: "Core team".to_string(),
                },
                CoreWallet {
                    address: "heli13w3en6ny39srs23gayt7wz9faayezqwqekzwmt".to_string(),
                    note: "DAOs treasury".to_string(),
                },
                CoreWallet {
                    address: "heli196slpj6yrqxj74ftpqspuzd609rqu9wl6j6fde".to_string(),
                    note: "DAOs outflow".to_string(),
                },
            ],
            decoy: DecoyParams::default(),
            walls: WallParams::default(),
        }
    }
}

/// Clients plus the process-wide mutable state (auth, scan cache, flow
/// snapshot). One instance, shared behind an Arc.
pub struct BotContext {
    pub config: MonitorConfig,
    pub lcd: LcdClient,
    pub mexc: MexcClient,
    pub coingecko: CoinGeckoClient,
    pub auth: RwLock<AuthStore>,
    scan_cache: TtlCache<(), NetworkUnbonding>,
    flow: Mutex<Option<FlowSnapshot>>,
}

impl BotContext {
    pub fn new(config: MonitorConfig) -> Result<Self, AlertError> {
        let lcd = LcdClient::new(config.lcd_base.clone())?;
        let mexc = MexcClient::new(config.mexc_base.clone())?;
        let coingecko = CoinGeckoClient::new(config.coingecko_base.clone())?;
        let auth = AuthStore::load(config.admin_id, &config.auth_path)?;
        let scan_ttl = Duration::from_secs(config.scan_ttl_secs);

        Ok(Self {
            config,
            lcd,
            mexc,
            coingecko,
            auth: RwLock::new(auth),
            scan_cache: TtlCache::new(scan_ttl),
            flow: Mutex::new(None),
        })
    }

    pub async fn is_allowed(&self, user_id: i64) -> bool {
        self.auth.read().await.is_allowed(user_id)
    }

    pub async fn is_admin(&self, user_id: i64) -> bool {
        self.auth.read().await.is_admin(user_id)
    }

    /// Current price, falling back to CoinGecko when the exchange
    /// reports a non-positive or missing price.
    pub async fn price(&self) -> Result<Option<f64>, FeedError> {
        match self.mexc.ticker_price(&self.config.symbol).await {
            Ok(price) if price > 0.0 => return Ok(Some(price)),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "primary price source failed"),
        }
        match self.coingecko.simple_price_usd(&self.config.coingecko_id).await {
            Ok(price) => Ok(price.filter(|p| *p > 0.0)),
            Err(e) => {
                warn!(error = %e, "fallback price source failed");
                Ok(None)
            }
        }
    }

    /// The cached network unbonding scan; at most one scan runs at a
    /// time and results are shared for the cache TTL.
    pub async fn network_unbonding(&self) -> Result<NetworkUnbonding, FeedError> {
        self.scan_cache
            .get_or_try_compute((), || scan_network_unbonding(&self.lcd, Utc::now()))
            .await
    }

    /// Take a flow snapshot of the current book and diff it against the
    /// previous one. The first call only seeds the snapshot (None).
    pub async fn record_flow(&self) -> Result<Option<FlowDelta>, FeedError> {
        let book = self.mexc.depth(&self.config.symbol, 500).await?;
        let current = FlowSnapshot::of(&book, Utc::now().timestamp());

        let mut slot = self.flow.lock().await;
        let delta = (*slot).map(|previous| flow_delta(previous, current));
        *slot = Some(current);
        Ok(delta)
    }
}
