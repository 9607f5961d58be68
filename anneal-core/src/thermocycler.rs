//! The thermocycler control loop
//!
//! One `tick` samples both sensors, advances the program state machine,
//! runs the plate and lid controllers, refreshes the ETA, updates the
//! display and drains pending commands. All control state is owned here;
//! collaborators are handed in at construction.

use heapless::String;
use micromath::F32Ext;

use crate::command::{Command, StartError, MAX_NAME_LEN};
use crate::config::ThermalConfig;
use crate::control::{AxisController, ControlMode, PlateController};
use crate::eta::{EtaEstimator, ProgramBudget};
use crate::program::{truncated, CycleId, ProgramTree, StepId};
use crate::state::{Event, ProgramState};
use crate::status::{CycleProgress, Status, ThermalState};
use crate::traits::{
    Board, CommandSource, PidLoop, ProgramStore, StatusDisplay, ThermalDirection,
};

/// Collaborators owned by the control loop
pub struct Parts<B, D, C, S, P> {
    pub board: B,
    pub display: D,
    pub link: C,
    pub store: S,
    pub plate_pid: P,
    pub lid_pid: P,
}

/// PCR thermocycler control loop
pub struct Thermocycler<B, D, C, S, P> {
    board: B,
    display: D,
    link: C,
    store: S,
    config: ThermalConfig,
    /// Skip stored-program recovery after a deliberate reset
    restarted: bool,

    state: ProgramState,
    program: ProgramTree,
    display_cycle: Option<CycleId>,
    current_step: Option<StepId>,
    name: String<MAX_NAME_LEN>,

    plate: PlateController<P>,
    lid: AxisController<P>,
    plate_temp: f32,
    lid_temp: f32,
    plate_stale: bool,
    lid_stale: bool,
    plate_target: Option<f32>,
    lid_target: f32,

    ramping: bool,
    ramp_start_ms: u32,
    ramp_start_temp: f32,
    hold_start_ms: u32,
    program_start_ms: u32,
    startup_at_ms: u32,
    last_display_reset_ms: u32,
    now_ms: u32,
    eta: EtaEstimator,
    last_start_error: Option<StartError>,
}

impl<B, D, C, S, P> Thermocycler<B, D, C, S, P>
where
    B: Board,
    D: StatusDisplay,
    C: CommandSource,
    S: ProgramStore,
    P: PidLoop,
{
    /// Create the control loop in the `Off` state
    ///
    /// The stored display contrast is applied immediately.
    pub fn new(parts: Parts<B, D, C, S, P>, config: ThermalConfig, restarted: bool) -> Self {
        let Parts {
            board,
            mut display,
            link,
            mut store,
            plate_pid,
            lid_pid,
        } = parts;

        display.set_contrast(store.retrieve_contrast());

        let plate = PlateController::new(plate_pid, &config);
        let lid = AxisController::new(
            lid_pid,
            config.lid_limits,
            config.lid_bang_bang_threshold_c,
            config.lid_tuning,
        );

        Self {
            board,
            display,
            link,
            store,
            config,
            restarted,
            state: ProgramState::Off,
            program: ProgramTree::new(),
            display_cycle: None,
            current_step: None,
            name: String::new(),
            plate,
            lid,
            plate_temp: 0.0,
            lid_temp: 0.0,
            plate_stale: false,
            lid_stale: false,
            plate_target: None,
            lid_target: 0.0,
            ramping: false,
            ramp_start_ms: 0,
            ramp_start_temp: 0.0,
            hold_start_ms: 0,
            program_start_ms: 0,
            startup_at_ms: 0,
            last_display_reset_ms: 0,
            now_ms: 0,
            eta: EtaEstimator::new(),
            last_start_error: None,
        }
    }

    /// Replace the loaded program
    ///
    /// Fully stops the previous program first. Without a display cycle the
    /// root's child cycle with the most repeats is used.
    pub fn set_program(
        &mut self,
        program: ProgramTree,
        display_cycle: Option<CycleId>,
        name: &str,
        lid_target: f32,
    ) {
        self.stop();

        self.program = program;
        self.display_cycle = display_cycle.or_else(|| self.program.largest_child_cycle());
        self.name = truncated(name);
        self.set_lid_target(lid_target);
    }

    /// Stop the run and release the program
    pub fn stop(&mut self) {
        self.state = self.state.transition(Event::Stop);

        self.program.reset();
        self.display_cycle = None;
        self.current_step = None;
        self.plate_target = None;
        self.ramping = false;
        self.eta.reset();

        self.display.clear();
    }

    /// Begin the loaded program by heating the lid
    pub fn start(&mut self) -> Result<(), StartError> {
        if !self.program.is_loaded() {
            return Err(StartError::NoProgram);
        }
        if self.state == ProgramState::Off {
            return Err(StartError::NoPower);
        }

        self.state = self.state.transition(Event::Start);
        Ok(())
    }

    /// Apply an operator command
    pub fn process_command(&mut self, command: Command) -> Result<(), StartError> {
        let result = match command {
            Command::Start(start) => {
                self.set_program(
                    start.program,
                    start.display_cycle,
                    &start.name,
                    start.lid_temp_c,
                );
                self.start()
            }
            Command::Stop => {
                self.stop();
                Ok(())
            }
            Command::Config { contrast } => {
                self.display.set_contrast(contrast);
                self.store.store_contrast(contrast);
                Ok(())
            }
        };
        self.last_start_error = result.err();
        result
    }

    /// Advance the control loop by one tick
    pub fn tick(&mut self, now_ms: u32) {
        self.now_ms = now_ms;

        self.check_power(now_ms);
        self.read_sensors();
        self.advance_state(now_ms);

        self.control_plate();
        self.control_lid();
        self.update_eta(now_ms);

        self.refresh_display(now_ms);

        while let Some(command) = self.link.process() {
            // Refusals are kept in `last_start_error`
            let _ = self.process_command(command);
        }
    }

    /// Current status snapshot
    pub fn status(&self) -> Status {
        let step_label = self
            .current_step
            .and_then(|id| self.program.step(id))
            .map(|step| truncated(step.label()))
            .unwrap_or_default();

        Status {
            state: self.state,
            thermal_state: self.thermal_state(),
            program_name: self.name.clone(),
            step_label,
            plate_temp_c: self.plate_temp,
            plate_target_c: self.plate_target,
            lid_temp_c: self.lid_temp,
            lid_target_c: self.lid_target,
            cycle: self.cycle_progress(),
            eta_s: (self.state == ProgramState::Running).then(|| self.eta.remaining_s()),
            elapsed_s: self.elapsed_s(),
            plate_stale: self.plate_stale,
            lid_stale: self.lid_stale,
        }
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn plate_temp(&self) -> f32 {
        self.plate_temp
    }

    pub fn lid_temp(&self) -> f32 {
        self.lid_temp
    }

    pub fn plate_target(&self) -> Option<f32> {
        self.plate_target
    }

    pub fn lid_target(&self) -> f32 {
        self.lid_target
    }

    /// Signed plate drive (negative cools)
    pub fn plate_drive(&self) -> f32 {
        self.plate.drive()
    }

    pub fn lid_drive(&self) -> f32 {
        self.lid.drive()
    }

    pub fn plate_mode(&self) -> ControlMode {
        self.plate.mode()
    }

    pub fn lid_mode(&self) -> ControlMode {
        self.lid.mode()
    }

    /// True while the plate converges on a new target
    pub fn is_ramping(&self) -> bool {
        self.ramping
    }

    /// Heating, cooling, holding or idle
    pub fn thermal_state(&self) -> ThermalState {
        ThermalState::derive(self.plate.direction(), self.ramping)
    }

    /// Current repeat of the display cycle, clamped to its repeat count
    pub fn current_cycle(&self) -> Option<u16> {
        self.cycle_progress().map(|p| p.current)
    }

    /// Repeat count of the display cycle
    pub fn num_cycles(&self) -> Option<u16> {
        self.cycle_progress().map(|p| p.total)
    }

    /// Seconds remaining as of the last tick
    pub fn eta_remaining_s(&self) -> u32 {
        self.eta.remaining_s()
    }

    /// Error from the most recent command, if it was refused
    pub fn last_start_error(&self) -> Option<StartError> {
        self.last_start_error
    }

    pub fn program(&self) -> &ProgramTree {
        &self.program
    }

    pub fn program_name(&self) -> &str {
        &self.name
    }

    pub fn step_pool_capacity(&self) -> usize {
        self.program.step_capacity()
    }

    pub fn cycle_pool_capacity(&self) -> usize {
        self.program.cycle_capacity()
    }

    pub fn config(&self) -> &ThermalConfig {
        &self.config
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn link_mut(&mut self) -> &mut C {
        &mut self.link
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn check_power(&mut self, now_ms: u32) {
        let present = self.board.power_present();
        if present && self.state == ProgramState::Off {
            self.state = self.state.transition(Event::PowerApplied);
            self.startup_at_ms = now_ms;
        } else if !present && self.state != ProgramState::Off {
            self.stop();
            self.state = self.state.transition(Event::PowerLost);
        }
    }

    fn read_sensors(&mut self) {
        // A failed read keeps the previous temperature
        match self.board.read_plate() {
            Ok(temp) => {
                self.plate_temp = temp;
                self.plate_stale = false;
            }
            Err(_) => self.plate_stale = true,
        }
        match self.board.read_lid() {
            Ok(temp) => {
                self.lid_temp = temp;
                self.lid_stale = false;
            }
            Err(_) => self.lid_stale = true,
        }
    }

    fn advance_state(&mut self, now_ms: u32) {
        match self.state {
            ProgramState::Startup => {
                if now_ms.wrapping_sub(self.startup_at_ms) > self.config.startup_delay_ms {
                    self.state = self.state.transition(Event::StartupElapsed);
                    self.resume_stored_program();
                }
            }
            ProgramState::LidWait => {
                if self.lid_temp >= self.lid_target - self.config.lid_start_tolerance_c {
                    self.enter_running(now_ms);
                }
            }
            ProgramState::Running => self.advance_program(now_ms),
            ProgramState::Complete => {
                // Track the final step settling for the display
                if let (true, Some((temp, _, _))) = (self.ramping, self.current_step_info()) {
                    if (temp - self.plate_temp).abs() <= self.config.cycle_start_tolerance_c {
                        self.ramping = false;
                    }
                }
            }
            ProgramState::Off | ProgramState::Stopped => {}
        }
    }

    fn resume_stored_program(&mut self) {
        if self.restarted || self.link.command_received() {
            return;
        }
        let scratch = self.link.buffer();
        if let Some(command) = self.store.retrieve_program(scratch) {
            let _ = self.process_command(command);
        }
    }

    fn enter_running(&mut self, now_ms: u32) {
        let Some(root) = self.program.root() else {
            return;
        };

        let budget = ProgramBudget::of_program(
            &mut self.program,
            root,
            self.plate_temp,
            self.config.cycle_start_tolerance_c,
        );
        self.eta.plan(budget);

        self.state = self.state.transition(Event::LidReady);
        self.plate.idle();
        // Force the first step to ramp even if its target is unchanged
        self.plate_target = None;

        self.program.begin_iteration(root);
        self.current_step = self.program.next_step(root);
        self.program_start_ms = now_ms;

        match self.current_step_info() {
            Some((temp, duration_s, _)) => {
                self.set_plate_target(temp, now_ms);
                if duration_s == 0 {
                    self.state = self.state.transition(Event::ProgramExhausted);
                }
            }
            None => self.state = self.state.transition(Event::ProgramExhausted),
        }
    }

    fn advance_program(&mut self, now_ms: u32) {
        let Some((temp, duration_s, is_final)) = self.current_step_info() else {
            return;
        };

        if self.ramping {
            if (temp - self.plate_temp).abs() <= self.config.cycle_start_tolerance_c {
                self.eta.ramp_completed(
                    self.ramp_start_temp,
                    self.plate_temp,
                    now_ms.wrapping_sub(self.ramp_start_ms),
                );
                self.ramping = false;
                self.hold_start_ms = now_ms;
            }
            return;
        }

        let held_ms = now_ms.wrapping_sub(self.hold_start_ms);
        if is_final || held_ms <= duration_s.saturating_mul(1000) {
            return;
        }

        let Some(root) = self.program.root() else {
            return;
        };
        self.current_step = self.program.next_step(root);

        let next = self.current_step_info();
        if let Some((temp, _, _)) = next {
            self.set_plate_target(temp, now_ms);
        }
        if next.map_or(true, |(_, duration_s, _)| duration_s == 0) {
            self.state = self.state.transition(Event::ProgramExhausted);
        }
    }

    fn set_plate_target(&mut self, target: f32, now_ms: u32) {
        if self.plate_target != Some(target) {
            self.ramping = true;
            self.ramp_start_ms = now_ms;
            self.ramp_start_temp = self.plate_temp;
        } else {
            // Same temperature: the next hold starts immediately
            self.hold_start_ms = now_ms;
        }

        self.plate_target = Some(target);
        self.plate.retarget(target, self.plate_temp, self.ramping);
    }

    fn set_lid_target(&mut self, target: f32) {
        self.lid_target = target;
        self.lid.retarget(target, self.lid_temp);
    }

    fn control_plate(&mut self) {
        let active = self.state.plate_active() && self.current_step.is_some();

        match self.plate_target {
            Some(target) if active => {
                self.plate.update(target, self.plate_temp);
            }
            _ => self.plate.idle(),
        }

        let drive = self.plate.drive();
        self.board
            .drive_plate(ThermalDirection::from_drive(drive), drive.abs() as u16);
    }

    fn control_lid(&mut self) {
        if self.state.lid_active() {
            self.lid.update(self.lid_target, self.lid_temp);
        } else {
            self.lid.idle();
        }
        self.board.drive_lid(self.lid.drive() as u8);
    }

    fn update_eta(&mut self, now_ms: u32) {
        match self.state {
            ProgramState::Running => {
                self.eta.update(self.elapsed_s_at(now_ms));
            }
            ProgramState::Complete => self.eta.finish(),
            _ => {}
        }
    }

    fn refresh_display(&mut self, now_ms: u32) {
        let since_reset = now_ms.wrapping_sub(self.last_display_reset_ms);
        if since_reset > self.config.display_reset_interval_ms {
            self.display.reset();
            self.last_display_reset_ms = now_ms;
        }

        let status = self.status();
        self.display.update(&status);
    }

    fn current_step_info(&self) -> Option<(f32, u32, bool)> {
        let step = self.program.step(self.current_step?)?;
        Some((step.temp_c(), step.duration_s(), step.is_final()))
    }

    fn cycle_progress(&self) -> Option<CycleProgress> {
        let cycle = self.program.cycle(self.display_cycle?)?;
        Some(CycleProgress {
            current: cycle.current_repeat(),
            total: cycle.repeats(),
        })
    }

    fn elapsed_s(&self) -> u32 {
        match self.state {
            ProgramState::Running | ProgramState::Complete => self.elapsed_s_at(self.now_ms),
            _ => 0,
        }
    }

    fn elapsed_s_at(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.program_start_ms) / 1000
    }
}
