use anyhow::{bail, Context, Result};
use trafficflow_shared::models::{
    ClosureState, ClosureToggle, SignalTimingUpdate, SignalTimings, Snapshot, SpawnUpdate,
};
use trafficflow_shared::protocol::{self, endpoint_url};

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

const USAGE: &str = "Usage: trafficflow-probe [--url BASE] [--toggle EDGE_ID | --spawn TICKS | --signals NS EW]";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Toggle(String),
    Spawn(i64),
    Signals(f64, f64),
}

fn get_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().skip_while(|a| *a != flag).nth(1).cloned()
}

fn get_args(args: &[String], flag: &str, count: usize) -> Option<Vec<String>> {
    let values: Vec<String> = args
        .iter()
        .skip_while(|a| *a != flag)
        .skip(1)
        .take(count)
        .cloned()
        .collect();
    (values.len() == count).then_some(values)
}

fn parse_command(args: &[String]) -> Result<Option<Command>> {
    if args.iter().any(|a| a == "--toggle") {
        let edge_id = get_arg(args, "--toggle").context("--toggle needs an edge id")?;
        return Ok(Some(Command::Toggle(edge_id)));
    }
    if args.iter().any(|a| a == "--spawn") {
        let raw = get_arg(args, "--spawn").context("--spawn needs a tick count")?;
        let ticks = raw
            .parse::<i64>()
            .with_context(|| format!("spawn interval {raw:?} is not a whole number"))?;
        return Ok(Some(Command::Spawn(ticks)));
    }
    if args.iter().any(|a| a == "--signals") {
        let values = get_args(args, "--signals", 2).context("--signals needs NS and EW seconds")?;
        let ns = values[0]
            .parse::<f64>()
            .with_context(|| format!("NS timing {:?} is not a number", values[0]))?;
        let ew = values[1]
            .parse::<f64>()
            .with_context(|| format!("EW timing {:?} is not a number", values[1]))?;
        return Ok(Some(Command::Signals(ns, ew)));
    }
    Ok(None)
}

fn fetch_snapshot(client: &reqwest::blocking::Client, base: &str) -> Result<Snapshot> {
    let url = endpoint_url(base, protocol::STATE_PATH);
    eprintln!("Fetching snapshot from {url}...");
    let resp = client.get(&url).send().context("snapshot request failed")?;
    if !resp.status().is_success() {
        bail!("snapshot request returned {}", resp.status());
    }
    let body = resp.bytes().context("snapshot body unreadable")?;
    Ok(protocol::decode_snapshot(&body)?)
}

fn post_json<B: serde::Serialize + ?Sized>(
    client: &reqwest::blocking::Client,
    base: &str,
    path: &str,
    body: &B,
) -> Result<Vec<u8>> {
    let url = endpoint_url(base, path);
    eprintln!("Posting to {url}...");
    let resp = client.post(&url).json(body).send().context("request failed")?;
    let status = resp.status();
    let bytes = resp.bytes().context("response body unreadable")?;
    if !status.is_success() {
        bail!(
            "{path} returned {status}: {}",
            String::from_utf8_lossy(&bytes).trim()
        );
    }
    Ok(bytes.to_vec())
}

fn run_command(client: &reqwest::blocking::Client, base: &str, command: &Command) -> Result<String> {
    match command {
        Command::Toggle(edge_id) => {
            let request = ClosureToggle {
                edge_id: edge_id.clone(),
            };
            let body = post_json(client, base, protocol::CLOSURE_TOGGLE_PATH, &request)?;
            let state: ClosureState = protocol::decode_json(&body)?;
            Ok(format_toggle(&state))
        }
        Command::Spawn(ticks) => {
            let body = post_json(
                client,
                base,
                protocol::SPAWN_PATH,
                &SpawnUpdate {
                    spawn_interval: *ticks,
                },
            )?;
            Ok(match protocol::decode_json::<SpawnUpdate>(&body) {
                Ok(applied) => format!("Spawn interval is now {} ticks", applied.spawn_interval),
                Err(_) => "Spawn interval updated".to_string(),
            })
        }
        Command::Signals(ns, ew) => {
            let body = post_json(
                client,
                base,
                protocol::SIGNALS_PATH,
                &SignalTimingUpdate { ns: *ns, ew: *ew },
            )?;
            Ok(match protocol::decode_json::<SignalTimings>(&body) {
                Ok(applied) => format!("Signal timings are now NS {}s, EW {}s", applied.ns, applied.ew),
                Err(_) => "Signal timings updated".to_string(),
            })
        }
    }
}

fn format_toggle(state: &ClosureState) -> String {
    format!("Road {} is now {}", state.edge_id, state.label())
}

fn format_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    out.push_str("=== Simulation ===\n");
    out.push_str(&format!("  Tick: {}\n", snapshot.tick));
    match &snapshot.network {
        Some(network) => out.push_str(&format!(
            "  Network: {} nodes, {} roads\n",
            network.nodes.len(),
            network.edges.len()
        )),
        None => out.push_str("  Network: (missing)\n"),
    }
    let stuck = snapshot.vehicles.iter().filter(|v| v.stuck).count();
    out.push_str(&format!(
        "  Vehicles: {} ({} stuck)\n",
        snapshot.vehicles.len(),
        stuck
    ));

    let mut closed: Vec<&str> = snapshot.closed_edges.iter().map(String::as_str).collect();
    closed.sort_unstable();
    if closed.is_empty() {
        out.push_str("  Closed roads: none\n");
    } else {
        out.push_str(&format!("  Closed roads: {}\n", closed.join(", ")));
    }

    if let Some(metrics) = &snapshot.metrics {
        out.push_str("\n=== Metrics ===\n");
        out.push_str(&format!("  Average speed:      {:.1} m/s\n", metrics.average_speed));
        out.push_str(&format!(
            "  Average commute:    {:.1} ticks\n",
            metrics.average_commute_time
        ));
        out.push_str(&format!("  Completed commutes: {}\n", metrics.completed_commutes));
        out.push_str(&format!("  Stuck vehicles:     {}\n", metrics.stuck_vehicles));
    }

    if let Some(settings) = &snapshot.settings {
        out.push_str("\n=== Settings ===\n");
        out.push_str(&format!("  Spawn interval: {} ticks\n", settings.spawn_interval));
        out.push_str(&format!(
            "  Signals:        NS {}s / EW {}s\n",
            settings.signal_timings.ns, settings.signal_timings.ew
        ));
    }

    if let Some(last) = snapshot.history.as_ref().and_then(|h| h.last()) {
        out.push_str(&format!(
            "\n=== History ===\n  {} samples, latest at tick {}: {:.1} m/s, {:.1} ticks\n",
            snapshot.history.as_ref().map_or(0, Vec::len),
            last.tick,
            last.average_speed,
            last.average_commute_time
        ));
    }
    out
}

fn run(args: &[String]) -> Result<()> {
    let base = get_arg(args, "--url").unwrap_or_else(|| DEFAULT_URL.to_string());
    let command = parse_command(args).context(USAGE)?;
    let client = reqwest::blocking::Client::new();

    if let Some(command) = &command {
        let answer = run_command(&client, &base, command)?;
        println!("{answer}\n");
    }

    let snapshot = fetch_snapshot(&client, &base)?;
    print!("{}", format_report(&snapshot));
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }
    run(&args)
}
