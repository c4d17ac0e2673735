//! # Motion worker
//!
//! Executing a motion blocks for its whole real world duration. The motion worker runs the gait
//! sequencer and trajectory planner on a dedicated thread, which becomes the sole owner of the
//! servo driver and the channel state. Commands are sent to it over a channel and progress comes
//! back as [`MotionEvent`]s.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::{
    sync::mpsc::{channel, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use log::{debug, error, info, warn};

use crate::{
    gait::{GaitError, GaitSeq},
    ramp_ctrl::{CancelToken, Ticker},
    servo_ctrl::{JointId, ServoDriver},
    traj::{LegPlan, TrajError, TrajPlanner, Waypoint},
};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Handle to the motion worker thread.
#[derive(Debug)]
pub struct MotionWorker {
    cmd_sender: Sender<MotionCmd>,
    event_receiver: Receiver<MotionEvent>,
    cancel: CancelToken,
    worker_jh: Option<JoinHandle<()>>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Commands which can be executed by the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionCmd {
    /// Apply operator entered angles to the given joints
    SetJoints(Vec<(JointId, String)>),

    /// Return to the home stance
    Home,

    /// Walk forward the given number of steps
    Forward(usize),

    /// Rotate the given number of steps, positive being anticlockwise
    Rotate(i64),

    /// Run a named gait macro the given number of times
    RunMacro(String, usize),

    /// Walk through a list of waypoints
    RunTrajectory(Vec<Waypoint>),

    /// Stop the worker thread
    Shutdown,
}

/// Events reported by the worker.
#[derive(Debug)]
pub enum MotionEvent {
    /// Execution of a command has begun
    Started(&'static str),

    /// One leg of a trajectory has been completed, along with the total number of legs.
    LegProgress(LegPlan, usize),

    /// The command has finished, successfully or not
    Finished(Result<(), MotionError>),
}

/// Error raised while executing a motion command.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error(transparent)]
    Gait(#[from] GaitError),

    #[error(transparent)]
    Traj(#[from] TrajError),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Could not start the motion worker thread: {0}")]
    SpawnFailed(std::io::Error),

    #[error("The motion worker has stopped")]
    Disconnected,

    #[error("The motion worker thread panicked")]
    Panicked,

    #[error("Motion failed: {0}")]
    Motion(#[from] MotionError),
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl MotionWorker {
    /// Start the worker thread, moving the motion stack into it.
    pub fn start<D, T>(seq: GaitSeq<D, T>, planner: TrajPlanner) -> Result<Self, WorkerError>
    where
        D: ServoDriver + Send + 'static,
        T: Ticker + Send + 'static
    {
        let cancel = seq.cancel_token();

        let (cmd_sender, cmd_receiver) = channel();
        let (event_sender, event_receiver) = channel();

        let worker_jh = thread::Builder::new()
            .name("walker::motion".into())
            .spawn(move || worker_thread(seq, planner, cmd_receiver, event_sender))
            .map_err(WorkerError::SpawnFailed)?;

        Ok(Self {
            cmd_sender,
            event_receiver,
            cancel,
            worker_jh: Some(worker_jh),
        })
    }

    /// Queue a command for execution.
    pub fn send(&self, cmd: MotionCmd) -> Result<(), WorkerError> {
        self.cmd_sender.send(cmd).map_err(|_| WorkerError::Disconnected)
    }

    /// Block until the next event from the worker.
    pub fn recv(&self) -> Result<MotionEvent, WorkerError> {
        self.event_receiver.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Get the next event if one is waiting.
    pub fn try_recv(&self) -> Result<Option<MotionEvent>, WorkerError> {
        match self.event_receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    /// Execute a command and wait for it to finish, passing every event to `on_event`.
    pub fn run<F>(&self, cmd: MotionCmd, mut on_event: F) -> Result<(), WorkerError>
    where
        F: FnMut(&MotionEvent)
    {
        self.send(cmd)?;

        loop {
            let event = self.recv()?;
            on_event(&event);

            if let MotionEvent::Finished(res) = event {
                return res.map_err(WorkerError::from)
            }
        }
    }

    /// Ask the running command to stop at its next tick.
    ///
    /// If no command is running yet the next one to start is cancelled. The request is cleared
    /// once that command has finished.
    pub fn cancel(&self) {
        self.cancel.cancel()
    }

    /// Token which cancels the worker's motions, for use from signal handlers.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop the worker once the current command has finished, and wait for it to exit.
    pub fn shutdown(mut self) -> Result<(), WorkerError> {
        // A worker that already stopped is not an error here
        self.cmd_sender.send(MotionCmd::Shutdown).ok();

        match self.worker_jh.take() {
            Some(jh) => jh.join().map_err(|_| WorkerError::Panicked),
            None => Ok(()),
        }
    }
}

impl MotionCmd {
    pub fn name(&self) -> &'static str {
        match self {
            MotionCmd::SetJoints(_) => "set joints",
            MotionCmd::Home => "home",
            MotionCmd::Forward(_) => "forward",
            MotionCmd::Rotate(_) => "rotate",
            MotionCmd::RunMacro(..) => "macro",
            MotionCmd::RunTrajectory(_) => "trajectory",
            MotionCmd::Shutdown => "shutdown",
        }
    }
}

impl MotionError {
    pub fn is_cancelled(&self) -> bool {
        match self {
            MotionError::Gait(e) => e.is_cancelled(),
            MotionError::Traj(e) => e.is_cancelled(),
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn worker_thread<D, T>(
    mut seq: GaitSeq<D, T>,
    planner: TrajPlanner,
    cmd_receiver: Receiver<MotionCmd>,
    event_sender: Sender<MotionEvent>
)
where
    D: ServoDriver,
    T: Ticker
{
    debug!("Motion worker started");

    while let Ok(cmd) = cmd_receiver.recv() {
        if cmd == MotionCmd::Shutdown {
            break
        }

        let name = cmd.name();

        if event_sender.send(MotionEvent::Started(name)).is_err() {
            break
        }

        let res = execute(&mut seq, &planner, cmd, &event_sender);

        match &res {
            Ok(()) => info!("Command \"{}\" complete", name),
            Err(e) if e.is_cancelled() => warn!("Command \"{}\" cancelled", name),
            Err(e) => error!("Command \"{}\" failed: {}", name, e),
        }

        // Cleared only once the command is over, so a cancel sent while it was queued still
        // reaches it
        seq.cancel_token().reset();

        if event_sender.send(MotionEvent::Finished(res)).is_err() {
            break
        }
    }

    debug!("Motion worker stopped");
}

fn execute<D, T>(
    seq: &mut GaitSeq<D, T>,
    planner: &TrajPlanner,
    cmd: MotionCmd,
    event_sender: &Sender<MotionEvent>
) -> Result<(), MotionError>
where
    D: ServoDriver,
    T: Ticker
{
    match cmd {
        MotionCmd::SetJoints(inputs) => {
            let inputs: Vec<(JointId, &str)> = inputs
                .iter()
                .map(|(j, s)| (*j, s.as_str()))
                .collect();
            seq.set_joints(&inputs)?
        },
        MotionCmd::Home => seq.home()?,
        MotionCmd::Forward(n) => seq.forward_step(n)?,
        MotionCmd::Rotate(n) => seq.rotate(n)?,
        MotionCmd::RunMacro(name, n) => seq.run_macro(&name, n)?,
        MotionCmd::RunTrajectory(waypoints) => {
            planner.run_trajectory(seq, &waypoints, |leg, num_legs| {
                // The receiver may have gone away, the trajectory still completes
                event_sender.send(MotionEvent::LegProgress(leg.clone(), num_legs)).ok();
            })?;
        },
        MotionCmd::Shutdown => (),
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        gait::{GaitLibrary, GaitParams},
        notifier::RecordingNotifier,
        ramp_ctrl::{RampCtrl, RampParams, RecordingTicker, ThreadTicker},
        servo_ctrl::{mock::MockDriver, JointMap},
        traj::TrajParams,
    };
    use std::sync::Arc;

    fn start<T>(driver: MockDriver, ticker: T, ramp_params: RampParams) -> MotionWorker
    where
        T: Ticker + Send + 'static
    {
        let ramp = RampCtrl::new(driver, ticker, ramp_params).unwrap();
        let seq = GaitSeq::new(
            ramp,
            JointMap::default(),
            GaitLibrary::builtin(),
            GaitParams::default(),
            Arc::new(RecordingNotifier::new())
        ).unwrap();

        MotionWorker::start(seq, TrajPlanner::new(TrajParams::default()).unwrap()).unwrap()
    }

    #[test]
    fn test_worker_runs_commands() {
        let driver = MockDriver::new();
        let worker = start(driver.clone(), RecordingTicker::new(), RampParams::default());

        let mut events = Vec::new();
        worker.run(MotionCmd::Forward(1), |e| events.push(format!("{:?}", e))).unwrap();

        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("Started(\"forward\")"));
        assert!(events[1].starts_with("Finished(Ok"));
        assert!(!driver.writes().is_empty());

        worker.shutdown().unwrap();
    }

    #[test]
    fn test_worker_trajectory_progress() {
        let worker = start(MockDriver::new(), RecordingTicker::new(), RampParams::default());

        let traj = vec![Waypoint::new(0.0, 0.0), Waypoint::new(1.0, 0.0), Waypoint::new(2.0, 0.0)];
        let mut legs = Vec::new();

        worker.run(MotionCmd::RunTrajectory(traj), |e| {
            if let MotionEvent::LegProgress(leg, n) = e {
                legs.push((leg.index, *n));
            }
        }).unwrap();

        assert_eq!(legs, vec![(1, 2), (2, 2)]);

        worker.shutdown().unwrap();
    }

    #[test]
    fn test_worker_reports_failures() {
        let worker = start(MockDriver::new(), RecordingTicker::new(), RampParams::default());

        let res = worker.run(MotionCmd::SetJoints(vec![(JointId::Elbow1, "abc".into())]), |_| ());
        assert!(matches!(
            res,
            Err(WorkerError::Motion(MotionError::Gait(GaitError::InvalidAngles(_))))
        ));

        let res = worker.run(MotionCmd::RunTrajectory(vec![]), |_| ());
        assert!(matches!(
            res,
            Err(WorkerError::Motion(MotionError::Traj(TrajError::EmptyTrajectory)))
        ));

        let res = worker.run(MotionCmd::RunMacro("moonwalk".into(), 1), |_| ());
        assert!(matches!(
            res,
            Err(WorkerError::Motion(MotionError::Gait(GaitError::UnknownMacro(_))))
        ));

        worker.shutdown().unwrap();
    }

    #[test]
    fn test_worker_cancel() {
        let driver = MockDriver::new();
        let params = RampParams {
            step_delay_s: 0.001,
            ..RampParams::default()
        };
        let worker = start(driver.clone(), ThreadTicker, params);

        // Long enough that it can't finish before being cancelled
        worker.send(MotionCmd::Forward(1000)).unwrap();
        assert!(matches!(worker.recv().unwrap(), MotionEvent::Started(_)));
        worker.cancel();

        match worker.recv().unwrap() {
            MotionEvent::Finished(Err(e)) => assert!(e.is_cancelled()),
            e => panic!("Expected cancellation, got {:?}", e),
        }

        // The next command runs normally
        let num_writes = driver.writes().len();
        worker.run(MotionCmd::SetJoints(vec![(JointId::Elbow4, "45".into())]), |_| ()).unwrap();
        assert!(driver.writes().len() > num_writes);

        worker.shutdown().unwrap();
    }

    #[test]
    fn test_worker_cancel_before_start() {
        let driver = MockDriver::new();
        let params = RampParams {
            step_delay_s: 0.001,
            ..RampParams::default()
        };
        let worker = start(driver.clone(), ThreadTicker, params);

        // Cancel straight after queueing, without waiting for the worker to pick it up
        worker.send(MotionCmd::Forward(3)).unwrap();
        worker.cancel();

        loop {
            match worker.recv().unwrap() {
                MotionEvent::Started(_) => (),
                MotionEvent::Finished(Err(e)) => {
                    assert!(e.is_cancelled());
                    break
                },
                e => panic!("Expected cancellation, got {:?}", e),
            }
        }

        // The request does not leak into the following command
        let res = worker.run(MotionCmd::SetJoints(vec![(JointId::Elbow4, "45".into())]), |_| ());
        assert!(res.is_ok());

        worker.shutdown().unwrap();
    }

    #[test]
    fn test_worker_try_recv() {
        let worker = start(MockDriver::new(), RecordingTicker::new(), RampParams::default());

        worker.send(MotionCmd::SetJoints(vec![(JointId::Elbow1, "45".into())])).unwrap();

        let mut finished = false;
        while !finished {
            match worker.try_recv().unwrap() {
                Some(MotionEvent::Finished(res)) => {
                    assert!(res.is_ok());
                    finished = true;
                },
                Some(_) | None => std::thread::yield_now(),
            }
        }
        assert!(worker.try_recv().unwrap().is_none());

        // Once the thread has exited and the queue is drained the worker is reported as gone
        let MotionWorker { cmd_sender, event_receiver, .. } = worker;
        cmd_sender.send(MotionCmd::Shutdown).unwrap();
        let gone = MotionWorker {
            cmd_sender,
            event_receiver,
            cancel: CancelToken::new(),
            worker_jh: None,
        };
        loop {
            match gone.try_recv() {
                Err(WorkerError::Disconnected) => break,
                Ok(_) => std::thread::yield_now(),
                Err(e) => panic!("Unexpected error {:?}", e),
            }
        }
    }
}
