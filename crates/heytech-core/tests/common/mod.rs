// Fake controller speaking the line protocol over a local TCP listener.
#![allow(clippy::unwrap_used, dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use heytech_core::{EngineConfig, Timings};

/// Produces the answer lines for one received line, given the line
/// received just before it.
pub type Responder = Arc<dyn Fn(&str, &str) -> Vec<String> + Send + Sync>;

pub struct FakeDevice {
    pub port: u16,
    received: Arc<Mutex<Vec<String>>>,
}

impl FakeDevice {
    pub async fn start() -> Self {
        Self::with_responder(Arc::new(standard_responses)).await
    }

    pub async fn with_responder(responder: Responder) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&received);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let log = Arc::clone(&log);
                let responder = Arc::clone(&responder);
                tokio::spawn(async move {
                    let (rd, mut wr) = socket.into_split();
                    let mut lines = BufReader::new(rd).lines();
                    let mut previous = String::new();
                    while let Ok(Some(line)) = lines.next_line().await {
                        let line = line.trim_end().to_owned();
                        log.lock().unwrap().push(line.clone());
                        for answer in responder(&previous, &line) {
                            if wr.write_all(format!("{answer}\r\n").as_bytes()).await.is_err() {
                                return;
                            }
                        }
                        previous = line;
                    }
                });
            }
        });

        Self { port, received }
    }

    /// Every line received so far, across all connections.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn config(&self) -> EngineConfig {
        let mut config = EngineConfig::new("127.0.0.1");
        config.port = self.port;
        config.periodic_polling = false;
        config.timings = fast_timings();
        config
    }

    /// Wait until `pred` holds for the received lines.
    pub async fn wait_for(&self, pred: impl Fn(&[String]) -> bool) -> Vec<String> {
        wait_until(Duration::from_secs(5), || pred(&self.received())).await;
        self.received()
    }
}

pub fn fast_timings() -> Timings {
    Timings {
        max_retries: 2,
        retry_delay: Duration::from_millis(20),
        connect_timeout: Duration::from_secs(1),
        handshake_delay: Duration::from_millis(1),
        user_pacing: Duration::from_millis(1),
        periodic_pacing: Duration::from_millis(1),
        idle_check_interval: Duration::from_millis(50),
        position_poll_interval: Duration::from_secs(60),
        climate_poll_interval: Duration::from_secs(60),
        max_channels_wait: Duration::from_secs(2),
        discovery_timeout: Duration::from_secs(3),
        stability_interval: Duration::from_millis(50),
        stability_rounds: 3,
        data_wait: Duration::from_secs(2),
    }
}

/// Poll `cond` every 10ms; panic after `limit`.
pub async fn wait_until(limit: Duration, cond: impl Fn() -> bool) {
    let waited = tokio::time::timeout(limit, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "condition not met within {limit:?}");
}

/// Index of the first occurrence of `needle` as a contiguous run.
pub fn find_run(haystack: &[String], needle: &[&str]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|w| w.iter().zip(needle).all(|(a, b)| a == b))
}

/// A small installation: three shutters, one scenario, one group.
pub fn standard_responses(previous: &str, line: &str) -> Vec<String> {
    let answers: &[&str] = match line {
        "smc" => &["start_smc3ende_smc"],
        "smn" => &[
            "start_smn1,Kitchen,0,ende_smn",
            "start_smn2,Living Room,0,ende_smn",
            "start_smn3,Bedroom,0,ende_smn",
            "start_smn65,Morning,0,ende_smn",
        ],
        "sop" => &["start_sop10,0,100,ende_sop"],
        "skd" => &["start_skd350,21,5,18,24,999,999,2,15,3,12,0,0,0,300,45,ende_skd"],
        "sau" => &["start_sau1ende_sau"],
        "sgz" => &["start_sgz1,3,0,ende_sgz"],
        "sla" => &["start_sla2ende_sla"],
        "sjp" => &["start_sjp1,1,15,ende_sjp"],
        "smo" => &["start_smoHEYtech RS879Mende_smo"],
        "sfi" => &["start_sfi8.027rende_sfi"],
        _ => &[],
    };
    if !answers.is_empty() {
        return answers.iter().map(|s| (*s).to_owned()).collect();
    }
    if previous == "sld" {
        if let Ok(n) = line.parse::<u32>() {
            return vec![format!(
                "start_sld{n};Kitchen;01.03.24;07:0{n}:00;up;Timer;ende_sld"
            )];
        }
    }
    Vec::new()
}
