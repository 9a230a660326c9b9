//! Integration tests for the discrete conservation properties.
//!
//! These tests verify:
//! - The residual has zero domain integral of mass, entropy and water on
//!   rectangular, skewed and curved meshes
//! - The centred scheme (a = 0) neither creates nor destroys energy
//! - The kinetic-energy dissipation only removes energy, linearly in a
//! - Forcing energy input shows up in the energy budget
//! - The Coriolis term turns the flow without doing work
//! - Long runs conserve the linear invariants to rounding

use std::f64::consts::PI;

use approx::assert_relative_eq;
use moist_euler_dg::{
    BoundaryConfig, DomainMap, DryIdealGas, EquationOfState, MappedDomain, MoistEulerSolver,
    MoistIdealGas, MoistState, PhysicsVariant, RectangularDomain, SkewedDomain, SolverConfig,
    UniformCooling,
};

const WIDTH: f64 = 4000.0;
const HEIGHT: f64 = 3000.0;

fn rectangle() -> RectangularDomain {
    RectangularDomain::new((0.0, WIDTH), (0.0, HEIGHT))
}

/// Deterministic node-by-node noise in [-0.5, 0.5); discontinuous across interfaces.
fn noise(p: usize) -> f64 {
    (p as f64 * 0.618_033_988_749_895).fract() - 0.5
}

/// Smooth large-scale flow with jumps between elements, as (u, w, h, T, qw).
fn perturbed_fields(
    x: &[f64],
    y: &[f64],
    moist: bool,
) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = x.len();
    let (mut u, mut w, mut h, mut t, mut qw) =
        (vec![0.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n]);
    for p in 0..n {
        let (kx, ky) = (2.0 * PI * x[p] / WIDTH, PI * y[p] / HEIGHT);
        u[p] = 3.0 * kx.sin() + noise(p);
        w[p] = 2.0 * kx.cos() * ky.sin() + 0.5 * noise(p + 7);
        h[p] = 1.2 * (1.0 + 0.02 * (kx + ky).cos() + 0.01 * noise(p + 13));
        t[p] = 300.0 + 2.0 * noise(p + 29);
        if moist {
            qw[p] = 0.01 + 0.002 * noise(p + 41);
        }
    }
    (u, w, h, t, qw)
}

fn dry_solver<M: DomainMap>(config: SolverConfig, map: &M) -> MoistEulerSolver<DryIdealGas> {
    let eos = DryIdealGas::default();
    let mut solver =
        MoistEulerSolver::new(config.with_physics(PhysicsVariant::SingleSpecies), map, eos)
            .unwrap();
    let mesh = solver.mesh().clone();
    let (u, w, h, t, qw) = perturbed_fields(&mesh.x, &mesh.y, false);
    let s = h
        .iter()
        .zip(&t)
        .map(|(&hp, &tp)| solver.eos().entropy_from_temperature(hp, tp))
        .collect();
    solver.set_initial_condition(u, w, h, s, qw).unwrap();
    solver
}

fn moist_solver<M: DomainMap>(config: SolverConfig, map: &M) -> MoistEulerSolver<MoistIdealGas> {
    let eos = MoistIdealGas::default();
    let mut solver =
        MoistEulerSolver::new(config.with_physics(PhysicsVariant::Moist), map, eos).unwrap();
    let mesh = solver.mesh().clone();
    let (u, w, h, t, qw) = perturbed_fields(&mesh.x, &mesh.y, true);
    let s = (0..h.len())
        .map(|p| solver.eos().entropy(h[p], qw[p], t[p]))
        .collect();
    solver.set_initial_condition(u, w, h, s, qw).unwrap();
    solver
}

fn magnitude(v: &[f64]) -> Vec<f64> {
    v.iter().map(|x| x.abs()).collect()
}

/// Check ∫ of every conserved tendency vanishes relative to ∫ of its magnitude.
fn assert_tendency_conserves<E: EquationOfState>(solver: &mut MoistEulerSolver<E>, water: bool) {
    let tendency = solver.residual().unwrap();
    let disc = solver.discretization();

    for (name, field) in [("h", &tendency.h), ("hs", &tendency.hs), ("hqw", &tendency.hqw)] {
        let scale = disc.integrate(&magnitude(field));
        if !water && name == "hqw" {
            assert_eq!(scale, 0.0);
            continue;
        }
        assert!(scale > 0.0, "{name} tendency vanished identically");
        let total = disc.integrate(field);
        assert!(
            total.abs() < 1e-10 * scale,
            "∫ d{name}/dt = {total:e} against scale {scale:e}"
        );
    }
}

/// ∫ of the magnitude of every term in the energy tendency.
fn energy_scale<E: EquationOfState>(solver: &MoistEulerSolver<E>, tendency: &MoistState) -> f64 {
    let state = solver.state();
    let thermo = solver.thermo();
    let y = &solver.mesh().y;
    let g = solver.config().gravity;
    let density: Vec<f64> = (0..state.len())
        .map(|p| {
            let kinetic = 0.5 * (state.u[p].powi(2) + state.w[p].powi(2));
            (state.h[p] * state.u[p] * tendency.u[p]).abs()
                + (state.h[p] * state.w[p] * tendency.w[p]).abs()
                + ((kinetic + g * y[p] + thermo.density_potential[p]) * tendency.h[p]).abs()
                + (thermo.temperature[p] * tendency.hs[p]).abs()
                + (thermo.chemical_potential[p] * tendency.hqw[p]).abs()
        })
        .collect();
    solver.discretization().integrate(&density)
}

#[test]
fn test_residual_conserves_on_rectangle() {
    let config = SolverConfig::new(3, 4, 3);
    assert_tendency_conserves(&mut dry_solver(config.clone(), &rectangle()), false);
    assert_tendency_conserves(&mut moist_solver(config, &rectangle()), true);
}

#[test]
fn test_residual_conserves_in_closed_box() {
    let config = SolverConfig::new(2, 3, 3).with_boundaries(BoundaryConfig::closed_box());
    assert_tendency_conserves(&mut moist_solver(config, &rectangle()), true);
}

#[test]
fn test_residual_conserves_on_skewed_mesh() {
    let domain = SkewedDomain::new(rectangle(), 0.3);
    let config = SolverConfig::new(3, 4, 3);
    assert_tendency_conserves(&mut moist_solver(config, &domain), true);
}

#[test]
fn test_residual_conserves_on_terrain_following_mesh() {
    // Periodic bump in the floor; the left and right edges stay vertical
    let domain = MappedDomain::new(
        |s, _t| WIDTH * s,
        |s, t| {
            let floor = 150.0 * (1.0 - (2.0 * PI * s).cos());
            floor + t * (HEIGHT - floor)
        },
    );
    let config = SolverConfig::new(3, 4, 3);
    assert_tendency_conserves(&mut moist_solver(config, &domain), true);
}

#[test]
fn test_centred_scheme_conserves_energy() {
    for gravity in [0.0, 9.81] {
        let config = SolverConfig::new(3, 4, 3)
            .with_dissipation(0.0)
            .with_gravity(gravity);
        let mut solver = moist_solver(config, &rectangle());
        let tendency = solver.residual().unwrap();
        let scale = energy_scale(&solver, &tendency);
        let rate = solver.energy_tendency().unwrap();
        assert!(
            rate.abs() < 1e-9 * scale,
            "g = {gravity}: dE/dt = {rate:e} against scale {scale:e}"
        );
    }
}

#[test]
fn test_dissipation_only_removes_energy() {
    let rate = |a: f64| {
        let config = SolverConfig::new(3, 4, 3).with_dissipation(a);
        let mut solver = dry_solver(config, &rectangle());
        solver.energy_tendency().unwrap()
    };
    let (e0, e_half, e1) = (rate(0.0), rate(0.5), rate(1.0));

    assert!(e_half < e0, "a = 0.5 gave {e_half:e}, a = 0 gave {e0:e}");
    assert!(e1 < e_half, "a = 1 gave {e1:e}, a = 0.5 gave {e_half:e}");
    // The dissipative part is linear in a
    assert_relative_eq!(e1 - e0, 2.0 * (e_half - e0), max_relative = 1e-6);
}

#[test]
fn test_forcing_energy_input_is_accounted() {
    let eos = DryIdealGas::default();
    let rate = -2e-4;
    let config = SolverConfig::new(2, 3, 3)
        .with_gravity(0.0)
        .with_physics(PhysicsVariant::SingleSpecies);
    let s = eos.entropy_from_temperature(1.2, 290.0);
    let cooling = UniformCooling::new(rate, eos.cv);

    let mut solver = MoistEulerSolver::new(config, &rectangle(), eos)
        .unwrap()
        .with_forcing(cooling);
    let n = solver.layout().n_total();
    solver
        .set_initial_condition(vec![0.0; n], vec![0.0; n], vec![1.2; n], vec![s; n], vec![0.0; n])
        .unwrap();

    // dE/dt = ∫ T ḣs = h cv dT/dt over the area
    let expected = 1.2 * solver.eos().cv * rate * WIDTH * HEIGHT;
    assert_relative_eq!(solver.energy_tendency().unwrap(), expected, max_relative = 1e-9);
}

#[test]
fn test_run_conserves_invariants() {
    let config = SolverConfig::new(3, 4, 4)
        .with_gravity(0.0)
        .with_dissipation(0.0)
        .with_boundaries(BoundaryConfig::fully_periodic());
    let eos = DryIdealGas::default();
    let mut solver = MoistEulerSolver::new(
        config.with_physics(PhysicsVariant::SingleSpecies),
        &rectangle(),
        eos,
    )
    .unwrap();

    // Smooth, well-resolved flow
    let mesh = solver.mesh().clone();
    let n = mesh.x.len();
    let (mut u, mut w, mut h, mut s) = (vec![0.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n]);
    for p in 0..n {
        let (kx, ky) = (2.0 * PI * mesh.x[p] / WIDTH, 2.0 * PI * mesh.y[p] / HEIGHT);
        u[p] = 3.0 * kx.sin();
        w[p] = 2.0 * ky.cos();
        h[p] = 1.2 * (1.0 + 0.01 * (kx + ky).sin());
        s[p] = solver
            .eos()
            .entropy_from_temperature(h[p], 300.0 + kx.cos());
    }
    solver
        .set_initial_condition(u, w, h, s, vec![0.0; n])
        .unwrap();

    let initial = solver.diagnostics().unwrap();
    for _ in 0..20 {
        solver.time_step(None).unwrap();
    }
    let current = solver.diagnostics().unwrap();

    assert_relative_eq!(current.total_mass, initial.total_mass, max_relative = 1e-12);
    assert_relative_eq!(current.total_entropy, initial.total_entropy, max_relative = 1e-12);
    let drift = (current.total_energy() - initial.total_energy()) / initial.total_energy();
    assert!(drift.abs() < 1e-8, "relative energy drift {drift:e}");
    assert!(current.kinetic_energy > 0.0);
}

#[test]
fn test_coriolis_turns_uniform_flow_without_work() {
    let (f, speed) = (1e-4, 12.0);
    let eos = DryIdealGas::default();
    let config = SolverConfig::new(3, 4, 3)
        .with_gravity(0.0)
        .with_dissipation(0.0)
        .with_coriolis(f)
        .with_boundaries(BoundaryConfig::fully_periodic())
        .with_physics(PhysicsVariant::SingleSpecies);
    let s = eos.entropy_from_temperature(1.2, 295.0);
    let mut solver = MoistEulerSolver::new(config, &rectangle(), eos).unwrap();
    let n = solver.layout().n_total();
    solver
        .set_initial_condition(vec![speed; n], vec![0.0; n], vec![1.2; n], vec![s; n], vec![0.0; n])
        .unwrap();

    let tendency = solver.residual().unwrap();
    let turning = f * speed;
    for p in 0..n {
        assert!(tendency.u[p].abs() < 1e-6 * turning, "du/dt = {} at node {p}", tendency.u[p]);
        assert_relative_eq!(tendency.w[p], -turning, max_relative = 1e-6);
        assert!(tendency.h[p].abs() < 1e-10);
    }

    // Work the rotation would do if it were not perpendicular to the flow
    let scale = 1.2 * speed * turning * WIDTH * HEIGHT;
    let rate = solver.energy_tendency().unwrap();
    assert!(rate.abs() < 1e-6 * scale, "dE/dt = {rate:e} against scale {scale:e}");
}
