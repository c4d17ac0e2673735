//! # Walker Executable
//!
//! Runs one motion command on the walker and exits:
//!
//! ```text
//! walker_exec home
//! walker_exec set shoulder_1=45 elbow_1=90
//! walker_exec forward 3
//! walker_exec rotate -- -4
//! walker_exec macro wave 2
//! walker_exec traj path.json
//! walker_exec plan path.json
//! ```
//!
//! Trajectory files are JSON arrays of `[distance, heading_deg]` pairs.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Result};
use log::{debug, info};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use structopt::{clap::AppSettings, StructOpt};

// Internal
use util::{host, logger::logger_init, session::Session};
use walker_lib::{
    gait::{GaitLibrary, GaitSeq},
    notifier::LogNotifier,
    params::{DriverParams, WalkerExecParams},
    ramp_ctrl::{RampCtrl, ThreadTicker},
    servo_ctrl::{JointId, JointMap, ServoDriver, SimDriver},
    traj::{load_trajectory, TrajPlanner},
    worker::{MotionCmd, MotionEvent, MotionWorker},
};

// ------------------------------------------------------------------------------------------------
// CLI
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "walker_exec", about = "Quadruped walker motion executable")]
struct Opts {
    /// Parameter file, relative to $WALKER_SW_ROOT/params unless absolute
    #[structopt(long, default_value = "walker_exec.toml")]
    params: String,

    /// Use the simulated servo driver whatever the parameters say
    #[structopt(long)]
    sim: bool,

    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Return every joint to the home stance
    Home,

    /// Set joint angles, given as joint=angle pairs
    Set {
        #[structopt(parse(try_from_str = parse_joint_angle), required = true)]
        angles: Vec<(JointId, String)>,
    },

    /// Walk forward a number of steps
    Forward {
        steps: usize,
    },

    /// Rotate a number of steps, positive being anticlockwise
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Rotate {
        steps: i64,
    },

    /// Run a gait macro by name
    Macro {
        name: String,

        #[structopt(default_value = "1")]
        repeats: usize,
    },

    /// Walk a trajectory file
    Traj {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },

    /// Print the plan of a trajectory file without moving
    Plan {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- LOAD PARAMETERS ----

    // Loaded before the logger since they hold the log levels
    let params: WalkerExecParams = if Path::new(&opts.params).is_absolute() {
        util::params::load_from_path(&opts.params)
    }
    else {
        util::params::load(&opts.params)
    }.wrap_err("Could not load walker_exec parameters")?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new("walker_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    let log_config = params.log.to_log_config()
        .wrap_err("Invalid log parameters")?;
    logger_init(&log_config, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Walker Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("Parameters: {:#?}", params);

    let planner = TrajPlanner::new(params.traj.clone())
        .wrap_err("Invalid trajectory parameters")?;

    // Planning needs no hardware
    if let Cmd::Plan { file } = &opts.cmd {
        let waypoints = load_trajectory(file)?;
        let legs = planner.plan(&waypoints)?;
        println!("{}", serde_json::to_string_pretty(&legs)?);
        return Ok(())
    }

    // ---- MOTION STACK INITIALISATION ----

    let joints = params.joint_map()?;

    let library = match &params.gait.gait_file {
        Some(file) => {
            let path = params_path(file)?;
            info!("Loading gaits from {:?}", path);
            GaitLibrary::from_file(&path).wrap_err("Could not load the gait file")?
        },
        None => GaitLibrary::builtin(),
    };
    info!("Gaits available: {:?}", library.names().collect::<Vec<_>>());

    let driver = init_driver(&params.driver, &joints, opts.sim)?;

    let ramp = RampCtrl::new(driver, ThreadTicker, params.ramp)
        .wrap_err("Invalid ramp parameters")?;
    let seq = GaitSeq::new(ramp, joints, library, params.gait.clone(), Arc::new(LogNotifier))?;

    let worker = MotionWorker::start(seq, planner)?;

    info!("Initialisation complete");

    // ---- EXECUTION ----

    let cmd = match opts.cmd {
        Cmd::Home => MotionCmd::Home,
        Cmd::Set { angles } => MotionCmd::SetJoints(angles),
        Cmd::Forward { steps } => MotionCmd::Forward(steps),
        Cmd::Rotate { steps } => MotionCmd::Rotate(steps),
        Cmd::Macro { name, repeats } => MotionCmd::RunMacro(name, repeats),
        Cmd::Traj { file } => MotionCmd::RunTrajectory(load_trajectory(&file)?),
        Cmd::Plan { .. } => return Err(eyre!("Plan has no motion to execute")),
    };

    let res = worker.run(cmd, |event| match event {
        MotionEvent::Started(name) => info!("Executing {}", name),
        MotionEvent::LegProgress(leg, num_legs) => info!(
            "Leg {}/{} complete: {} rotate, {} forward steps",
            leg.index, num_legs, leg.rotate_steps, leg.forward_steps
        ),
        MotionEvent::Finished(_) => (),
    });

    worker.shutdown()?;

    res.wrap_err("Motion failed")?;

    info!("Done");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a `joint=angle` pair, the angle is validated later by the gait sequencer.
fn parse_joint_angle(arg: &str) -> Result<(JointId, String), String> {
    let mut parts = arg.splitn(2, '=');

    match (parts.next(), parts.next()) {
        (Some(joint), Some(angle)) => {
            let joint = joint.parse::<JointId>().map_err(|e| e.to_string())?;
            Ok((joint, angle.to_string()))
        },
        _ => Err(format!("Expected joint=angle, found \"{}\"", arg)),
    }
}

/// Resolve a file given in the parameters, relative to the params directory unless absolute.
fn params_path(file: &str) -> Result<PathBuf> {
    if Path::new(file).is_absolute() {
        return Ok(PathBuf::from(file))
    }

    let mut path = host::get_walker_sw_root()
        .wrap_err("The WALKER_SW_ROOT environment variable is not set")?;
    path.push("params");
    path.push(file);

    Ok(path)
}

/// Create the servo driver selected in the parameters.
#[cfg_attr(not(all(target_arch = "arm", target_os = "linux")), allow(unused_variables))]
fn init_driver(
    params: &DriverParams,
    joints: &JointMap,
    force_sim: bool
) -> Result<Box<dyn ServoDriver + Send>> {

    if force_sim {
        info!("Using the simulated servo driver");
        return Ok(Box::new(SimDriver::new()))
    }

    match params {
        DriverParams::Sim => {
            info!("Using the simulated servo driver");
            Ok(Box::new(SimDriver::new()))
        },

        #[cfg(all(target_arch = "arm", target_os = "linux"))]
        DriverParams::RpiGpio => {
            use walker_lib::servo_ctrl::rpi_gpio::RpiGpioDriver;

            info!("Using the Raspberry Pi GPIO servo driver");
            Ok(Box::new(
                RpiGpioDriver::new(joints).wrap_err("Could not claim the GPIO pins")?
            ))
        },

        #[cfg(all(target_arch = "arm", target_os = "linux"))]
        DriverParams::Pca9685 { i2c_bus, address } => {
            use walker_lib::servo_ctrl::pca9685::init_pca9685;

            info!("Using the PCA9685 servo driver at {:#x} on I2C bus {}", address, i2c_bus);
            let i2c = rppal::i2c::I2c::with_bus(*i2c_bus)
                .wrap_err("Could not open the I2C bus")?;
            Ok(Box::new(
                init_pca9685(i2c, *address).wrap_err("Could not initialise the PCA9685")?
            ))
        },

        #[cfg(not(all(target_arch = "arm", target_os = "linux")))]
        other => Err(eyre!("The {:?} driver is only available on the Raspberry Pi", other)),
    }
}
