use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use thiserror::Error;
use tch::{Device, Kind, Tensor};

use crate::env::{Env as EnvTrait, DIMS};
use crate::error::EnvError;
use crate::policy::Policy;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectError {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("collecting thread panicked: {0}")]
    WorkerPanicked(String),
    #[error("collecting threads are gone")]
    WorkersGone,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Transitions gathered by one `collect` call, concatenated across threads.
#[must_use]
#[derive(Debug)]
pub struct Payload {
    pub observations: Tensor,
    pub next_observations: Tensor,
    pub actions: Tensor,
    pub rewards: Tensor,
    pub episodes_not_terminated: Tensor,
}

impl Payload {
    pub fn new(num_steps: usize, device: Device) -> Self {
        let num_steps = num_steps as i64;

        let options = (Kind::Float, device);

        Self {
            observations: Tensor::zeros([num_steps, DIMS as i64], options),
            next_observations: Tensor::zeros([num_steps, DIMS as i64], options),
            actions: Tensor::zeros([num_steps, DIMS as i64], options),
            rewards: Tensor::zeros([num_steps], options),
            episodes_not_terminated: Tensor::zeros([num_steps], options),
        }
    }

    fn empty(device: Device) -> Self {
        Self::new(0, device)
    }

    fn append(self, other: Self) -> Self {
        Self {
            observations: Tensor::cat(&[self.observations, other.observations], 0),
            next_observations: Tensor::cat(&[self.next_observations, other.next_observations], 0),
            actions: Tensor::cat(&[self.actions, other.actions], 0),
            rewards: Tensor::cat(&[self.rewards, other.rewards], 0),
            episodes_not_terminated: Tensor::cat(
                &[self.episodes_not_terminated, other.episodes_not_terminated],
                0,
            ),
        }
    }

    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.rewards.size()[0] as usize
    }

    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        if self.num_steps() == 0 {
            return 0.0;
        }
        self.rewards.mean(Kind::Float).double_value(&[])
    }

    /// Number of transitions that ended an episode.
    #[must_use]
    pub fn completed_episodes(&self) -> usize {
        let num_steps = self.num_steps() as f64;
        let not_terminated = self.episodes_not_terminated.sum(Kind::Float).double_value(&[]);
        (num_steps - not_terminated).round() as usize
    }
}

enum Broadcast {
    Collect,
    Terminate,
}

struct CollectingThreadOptions<'a, Env, P>
where
    Env: EnvTrait,
    P: Policy,
{
    device: Device,
    env: &'a Env,
    policy: &'a P,
    seed: u64,
    num_steps: usize,
    broadcast_rx: &'a Receiver<Broadcast>,
    collecting_tx: &'a Sender<Result<Payload, CollectError>>,
}

fn collect_steps<Env, P>(
    env: &mut Env,
    policy: &mut P,
    observation: &mut [f32; DIMS],
    num_steps: usize,
    device: Device,
) -> Result<Payload, CollectError>
where
    Env: EnvTrait,
    P: Policy,
{
    let payload = Payload::new(num_steps, device);

    for i in 0..(num_steps as i64) {
        payload
            .observations
            .get(i)
            .copy_(&Tensor::from_slice(observation.as_slice()));

        let action = policy.act(observation);
        payload
            .actions
            .get(i)
            .copy_(&Tensor::from_slice(action.as_slice()));

        let step = env.step(&action)?;
        _ = payload.rewards.get(i).fill_(f64::from(step.reward));
        payload
            .next_observations
            .get(i)
            .copy_(&Tensor::from_slice(step.observation.as_slice()));

        if step.done {
            *observation = env.reset();
        } else {
            _ = payload.episodes_not_terminated.get(i).fill_(1.0);
            *observation = step.observation;
        }
    }

    Ok(payload)
}

fn spawn_collecting_thread<Env, P>(
    CollectingThreadOptions {
        device,
        env,
        policy,
        seed,
        num_steps,
        broadcast_rx,
        collecting_tx,
    }: CollectingThreadOptions<Env, P>,
) -> thread::JoinHandle<()>
where
    Env: EnvTrait,
    P: Policy,
{
    let broadcast_rx = broadcast_rx.clone();
    let collecting_tx = collecting_tx.clone();

    let mut local_env = env.clone();
    let mut local_policy = policy.clone();
    local_policy.reseed(seed);

    thread::spawn(move || {
        let mut observation = local_env.reset();

        while let Ok(msg) = broadcast_rx.recv() {
            match msg {
                Broadcast::Collect => {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        collect_steps(
                            &mut local_env,
                            &mut local_policy,
                            &mut observation,
                            num_steps,
                            device,
                        )
                    }))
                    .unwrap_or_else(|payload| {
                        Err(CollectError::WorkerPanicked(panic_message(&*payload)))
                    });

                    if result.is_err() {
                        observation = local_env.reset();
                    }

                    if collecting_tx.send(result).is_err() {
                        break;
                    }
                }
                Broadcast::Terminate => {
                    break;
                }
            }
        }

        local_env.close();
    })
}

/// Gathers transitions in parallel. Every thread owns a clone of the
/// environment and a reseeded clone of the policy.
#[must_use]
pub struct Collector {
    num_threads: usize,
    thread_handles: Vec<thread::JoinHandle<()>>,
    broadcaster: Sender<Broadcast>,
    collecting_rx: Receiver<Result<Payload, CollectError>>,
    device: Device,
}

impl Drop for Collector {
    fn drop(&mut self) {
        for _ in 0..self.thread_handles.len() {
            _ = self.broadcaster.send(Broadcast::Terminate);
        }

        for handle in self.thread_handles.drain(..) {
            if handle.join().is_err() {
                tracing::error!("collecting thread panicked");
            }
        }
    }
}

pub struct Options<'a, Env, P>
where
    Env: EnvTrait,
    P: Policy,
{
    pub device: Device,
    pub env: &'a Env,
    pub policy: &'a P,
    pub seed: u64,
    pub num_steps: usize,
    pub num_threads: usize,
}

impl Collector {
    /// # Panics
    ///
    /// Panics if `num_threads` is zero or does not divide `num_steps`.
    pub fn new<Env, P>(
        Options {
            device,
            env,
            policy,
            seed,
            num_steps,
            num_threads,
        }: Options<Env, P>,
    ) -> Self
    where
        Env: EnvTrait,
        P: Policy,
    {
        let mut thread_handles = Vec::new();

        let (broadcaster, broadcast_rx) = channel::unbounded();

        let (collecting_tx, collecting_rx) = channel::unbounded();

        assert!(num_threads > 0, "collector needs at least one thread");
        assert_eq!(num_steps % num_threads, 0);
        let num_steps_per_thread = num_steps / num_threads;

        for i in 0..num_threads {
            let handle = spawn_collecting_thread(CollectingThreadOptions {
                device,
                env,
                policy,
                seed: seed.wrapping_add(i as u64),
                num_steps: num_steps_per_thread,
                broadcast_rx: &broadcast_rx,
                collecting_tx: &collecting_tx,
            });

            thread_handles.push(handle);
        }

        tracing::debug!(num_threads, num_steps, "collector started");

        Self {
            num_threads,
            thread_handles,
            broadcaster,
            collecting_rx,
            device,
        }
    }

    /// Asks every thread for its share of steps and concatenates the results.
    /// The first error reported by any thread, environment failure or panic,
    /// is returned after all threads have answered.
    pub fn collect(&self) -> Result<Payload, CollectError> {
        for _ in 0..self.num_threads {
            _ = self.broadcaster.send(Broadcast::Collect);
        }

        let mut payload = Payload::empty(self.device);
        let mut first_err = None;

        for _ in 0..self.num_threads {
            let Ok(result) = self.collecting_rx.recv() else {
                return Err(CollectError::WorkersGone);
            };

            match result {
                Ok(part) => payload = payload.append(part),
                Err(err) => {
                    tracing::warn!(%err, "collecting thread failed");
                    first_err.get_or_insert(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(payload),
        }
    }
}
