//! Bot lifecycle: command dispatch and the idle loop that drives the relay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use sodam_relay::{Relay, RelayOptions, Transport};
use sysinfo::{ProcessesToUpdate, System};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::commands::{self, Command, Invocation, Sender};
use crate::config::Config;
use crate::gateway::Responder;

pub struct Bot<C: Transport> {
    config:    Config,
    relay:     Relay<C>,
    responder: Arc<dyn Responder>,
    commands:  Vec<Command<C>>,
    running:   AtomicBool,
    started:   Instant,
    /// Lives as long as the bot: CPU usage is a delta against the previous
    /// refresh, and a freshly built `System` has no baseline to diff from.
    system:    Mutex<System>,
}

impl<C: Transport> Bot<C> {
    pub fn new(config: Config, transport: C, responder: Arc<dyn Responder>) -> Self {
        let commands = commands::registry(&config);

        info!(count = commands.len(), "registered command(s)");

        let relay = Relay::new(transport, RelayOptions {
            max_response_bytes: config.relay.max_response_bytes,
        });

        // baseline snapshot for the first CPU reading
        let mut system = System::new();
        if let Ok(pid) = sysinfo::get_current_pid() {
            system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        }

        Self {
            config,
            relay,
            responder,
            commands,
            running: AtomicBool::new(true),
            started: Instant::now(),
            system: Mutex::new(system),
        }
    }

    /// CPU usage (percent) and resident memory (MiB) of this process, as a
    /// delta since the previous reading.
    pub fn process_stats(&self) -> (f32, f64) {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return (0.0, 0.0);
        };

        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        match system.process(pid) {
            Some(process) => (
                process.cpu_usage(),
                process.memory() as f64 / (1024.0 * 1024.0),
            ),
            None => (0.0, 0.0),
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn relay(&self) -> &Relay<C> { &self.relay }

    pub fn responder(&self) -> &Arc<dyn Responder> { &self.responder }

    pub fn uptime(&self) -> Duration { self.started.elapsed() }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.relay.request_timeout_secs)
    }

    pub fn is_owner(&self, sender: Sender) -> bool {
        match sender {
            Sender::Console => true,
            Sender::User(id) => self.config.owner == Some(id),
        }
    }

    pub fn stop(&self) { self.running.store(false, Ordering::SeqCst); }

    pub fn is_running(&self) -> bool { self.running.load(Ordering::SeqCst) }

    pub fn dispatch(&self, invocation: &Invocation) {
        match self
            .commands
            .iter()
            .find(|command| command.name == invocation.command)
        {
            Some(command) => {
                info!(command = command.name, "handling command");
                (command.run)(self, invocation);
            }
            None => warn!(command = %invocation.command, "unknown command"),
        }
    }

    /// The idle loop: one tick handles pending console lines, drains the
    /// relay once, then sleeps. The sleep is the only blocking wait in the
    /// system; drain itself never blocks.
    pub async fn run(&self, console: &mut mpsc::UnboundedReceiver<String>) {
        let tick = Duration::from_millis(self.config.relay.tick_ms.max(1));

        while self.is_running() {
            while let Ok(line) = console.try_recv() {
                if let Some(invocation) = Invocation::parse(&line) {
                    self.dispatch(&invocation);
                }
            }

            self.relay.drain();

            tokio::time::sleep(tick).await;
        }

        info!("shutting down the bot");

        self.relay.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KrdictConfig;
    use crate::testing::{Script, test_bot};

    #[test]
    fn unknown_commands_are_ignored() {
        let (bot, responder) = test_bot(Config::default(), Vec::new());

        bot.dispatch(&Invocation::parse("/definitely-not-a-command").unwrap());

        assert!(responder.take().is_empty());
        assert!(bot.relay().is_empty());
    }

    #[test]
    fn console_sender_is_owner_privileged() {
        let (bot, _responder) = test_bot(Config::default(), Vec::new());

        assert!(bot.is_owner(Sender::Console));
        assert!(!bot.is_owner(Sender::User(42)));
    }

    #[test]
    fn owner_id_from_config_is_honored() {
        let config = Config {
            owner: Some(42),
            ..Config::default()
        };
        let (bot, _responder) = test_bot(config, Vec::new());

        assert!(bot.is_owner(Sender::User(42)));
        assert!(!bot.is_owner(Sender::User(43)));
    }

    #[test]
    fn shutdown_discards_in_flight_requests_without_replies() {
        let config = Config {
            krdict: KrdictConfig {
                enable: true,
                ..Default::default()
            },
            ..Config::default()
        };
        let (bot, responder) = test_bot(config, vec![Script::Stall]);

        bot.dispatch(&Invocation::parse("/krd 사과").unwrap());
        assert_eq!(bot.relay().len(), 1);

        bot.relay().shutdown();
        bot.relay().drain();

        assert!(bot.relay().is_empty());
        assert!(responder.take().is_empty());
    }

    #[test]
    fn cpu_reading_diffs_against_the_previous_refresh() {
        let (bot, _responder) = test_bot(Config::default(), Vec::new());

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let burner = std::thread::spawn(move || {
            let mut x: u64 = 0;
            while !flag.load(Ordering::Relaxed) {
                x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
                std::hint::black_box(x);
            }
        });

        // long enough past sysinfo's minimum CPU update interval for the
        // delta against the startup baseline to be visible
        std::thread::sleep(Duration::from_millis(400));

        let (cpu, ram) = bot.process_stats();

        stop.store(true, Ordering::Relaxed);
        burner.join().unwrap();

        assert!(cpu > 0.0);
        assert!(ram > 0.0);
    }

    #[test]
    fn stop_flips_the_running_flag() {
        let (bot, responder) = test_bot(Config::default(), Vec::new());

        assert!(bot.is_running());

        bot.dispatch(&Invocation::parse("/stop").unwrap());

        assert!(!bot.is_running());
        assert_eq!(responder.take().len(), 1);
    }
}
