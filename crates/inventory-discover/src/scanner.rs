//! Bounded concurrent subnet scanner.
//!
//! One tokio task per host address. A semaphore caps the number of probes
//! in flight: the admission loop waits for a permit before spawning the
//! next task, and each task releases its permit when the probe returns.
//! Verdicts are drained from a `JoinSet` by this single collector and the
//! responsive addresses are sorted once, after every probe has finished.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use uuid::Uuid;

use crate::error::Result;
use crate::probe::HostProbe;
use crate::subnet::Subnet;

/// Default ceiling on simultaneous probes.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 255;

/// Scans subnets with a [`HostProbe`].
pub struct SubnetScanner<P> {
    probe: Arc<P>,
    max_in_flight: usize,
}

impl<P: HostProbe> SubnetScanner<P> {
    /// `max_in_flight` is clamped to at least 1.
    pub fn new(probe: P, max_in_flight: usize) -> Self {
        Self {
            probe: Arc::new(probe),
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Parse `cidr` and scan it. Malformed input is the only failure.
    pub async fn scan_cidr(&self, cidr: &str) -> Result<Vec<Ipv4Addr>> {
        let subnet = Subnet::parse(cidr)?;
        Ok(self.scan(&subnet).await)
    }

    /// Probe every usable host in `subnet` and return the responsive ones in
    /// ascending order. Individual probe failures never fail the scan.
    pub async fn scan(&self, subnet: &Subnet) -> Vec<Ipv4Addr> {
        let scan_id = Uuid::new_v4();
        let start = Instant::now();

        tracing::info!(
            scan_id = %scan_id,
            subnet = %subnet,
            hosts = subnet.host_count(),
            max_in_flight = self.max_in_flight,
            "Starting subnet scan"
        );

        let responsive = self.scan_hosts(scan_id, subnet.hosts()).await;

        tracing::info!(
            scan_id = %scan_id,
            subnet = %subnet,
            responsive = responsive.len(),
            duration_ms = start.elapsed().as_millis(),
            "Subnet scan complete"
        );

        responsive
    }

    /// Probe `hosts` under the in-flight ceiling and return the responsive
    /// ones sorted. An empty host list yields an empty result.
    pub async fn scan_hosts<I>(&self, scan_id: Uuid, hosts: I) -> Vec<Ipv4Addr>
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut probes = JoinSet::new();
        let mut responsive = Vec::new();

        for addr in hosts {
            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let probe = self.probe.clone();
            probes.spawn(async move {
                let reachable = probe.probe(addr).await;
                drop(permit);
                (addr, reachable)
            });

            while let Some(joined) = probes.try_join_next() {
                collect(scan_id, joined, &mut responsive);
            }
        }

        while let Some(joined) = probes.join_next().await {
            collect(scan_id, joined, &mut responsive);
        }

        responsive.sort_unstable();
        responsive
    }
}

fn collect(
    scan_id: Uuid,
    joined: std::result::Result<(Ipv4Addr, bool), JoinError>,
    responsive: &mut Vec<Ipv4Addr>,
) {
    match joined {
        Ok((addr, true)) => {
            tracing::debug!(scan_id = %scan_id, addr = %addr, "Command API reachable");
            responsive.push(addr);
        }
        Ok((_, false)) => {}
        Err(e) => tracing::error!(scan_id = %scan_id, error = %e, "Probe task panicked"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    /// Fake probe with per-address latency that records peak concurrency.
    struct FakeProbe {
        reachable: HashSet<Ipv4Addr>,
        delay: fn(Ipv4Addr) -> Duration,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeProbe {
        fn new(reachable: &[Ipv4Addr], delay: fn(Ipv4Addr) -> Duration) -> Self {
            Self {
                reachable: reachable.iter().copied().collect(),
                delay,
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl HostProbe for FakeProbe {
        async fn probe(&self, addr: Ipv4Addr) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep((self.delay)(addr)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.reachable.contains(&addr)
        }
    }

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn no_delay(_: Ipv4Addr) -> Duration {
        Duration::ZERO
    }

    #[tokio::test]
    async fn test_scan_returns_reachable_in_order_regardless_of_timing() {
        // 10.0.0.0/29 has hosts .1 through .6; .1 answers last, .3 first.
        fn delay(addr: Ipv4Addr) -> Duration {
            match addr.octets()[3] {
                1 => Duration::from_millis(80),
                2 => Duration::from_millis(40),
                3 => Duration::from_millis(1),
                _ => Duration::from_millis(20),
            }
        }
        let probe = FakeProbe::new(&[ip("10.0.0.3"), ip("10.0.0.1")], delay);
        let scanner = SubnetScanner::new(probe, DEFAULT_MAX_IN_FLIGHT);

        let found = scanner.scan(&Subnet::parse("10.0.0.0/29").unwrap()).await;
        assert_eq!(found, vec![ip("10.0.0.1"), ip("10.0.0.3")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_never_exceeds_ceiling() {
        fn delay(_: Ipv4Addr) -> Duration {
            Duration::from_millis(10)
        }
        let probe = FakeProbe::new(&[], delay);
        let peak = probe.peak.clone();
        let calls = probe.calls.clone();
        let scanner = SubnetScanner::new(probe, 8);

        let subnet = Subnet::parse("10.1.0.0/25").unwrap();
        let found = scanner.scan(&subnet).await;

        assert!(found.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 126);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 8, "peak concurrency {peak} exceeded ceiling");
        assert_eq!(peak, 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_result_is_sorted_unique_subset() {
        let subnet = Subnet::parse("192.168.8.0/23").unwrap();
        let reachable: Vec<Ipv4Addr> = subnet
            .hosts()
            .filter(|a| u32::from(*a) % 7 == 0)
            .collect();
        fn delay(addr: Ipv4Addr) -> Duration {
            Duration::from_micros(u64::from(u32::from(addr) % 13) * 100)
        }
        let scanner = SubnetScanner::new(FakeProbe::new(&reachable, delay), 32);

        let found = scanner.scan(&subnet).await;
        assert!(found.windows(2).all(|w| w[0] < w[1]));
        assert!(found.iter().all(|a| subnet.contains(*a)));
        assert_eq!(found, reachable);
    }

    #[tokio::test]
    async fn test_empty_host_list_yields_empty_result() {
        let probe = FakeProbe::new(&[ip("10.0.0.1")], no_delay);
        let calls = probe.calls.clone();
        let scanner = SubnetScanner::new(probe, DEFAULT_MAX_IN_FLIGHT);

        let found = scanner.scan_hosts(Uuid::nil(), std::iter::empty()).await;
        assert!(found.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_host_route_is_scanned() {
        let probe = FakeProbe::new(&[ip("10.0.0.5")], no_delay);
        let calls = probe.calls.clone();
        let scanner = SubnetScanner::new(probe, DEFAULT_MAX_IN_FLIGHT);

        let found = scanner.scan(&Subnet::parse("10.0.0.5/32").unwrap()).await;
        assert_eq!(found, vec![ip("10.0.0.5")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_point_to_point_subnet_scans_both_ends() {
        let probe = FakeProbe::new(&[ip("10.0.0.1"), ip("10.0.0.0")], no_delay);
        let scanner = SubnetScanner::new(probe, DEFAULT_MAX_IN_FLIGHT);

        let found = scanner.scan(&Subnet::parse("10.0.0.0/31").unwrap()).await;
        assert_eq!(found, vec![ip("10.0.0.0"), ip("10.0.0.1")]);
    }

    #[tokio::test]
    async fn test_scan_cidr_rejects_malformed_input() {
        let scanner = SubnetScanner::new(FakeProbe::new(&[], no_delay), 4);
        assert!(scanner.scan_cidr("10.0.0.0/40").await.is_err());
        assert_eq!(
            scanner.scan_cidr("10.0.0.0/30").await.unwrap(),
            Vec::<Ipv4Addr>::new()
        );
    }

    #[test]
    fn test_zero_ceiling_is_clamped() {
        let scanner = SubnetScanner::new(FakeProbe::new(&[], no_delay), 0);
        assert_eq!(scanner.max_in_flight(), 1);
    }
}
