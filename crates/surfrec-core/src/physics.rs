//! Gas-kinetic constants and rate expressions (SI units).

/// Boltzmann constant (J/K)
pub const K_B: f64 = 1.380649e-23;

/// Avogadro constant as used by the recombination models (1/mol)
pub const N_A: f64 = 6.023e23;

/// Pi
pub const PI: f64 = std::f64::consts::PI;

/// Mean thermal speed of a Maxwellian gas: sqrt(8 k_B T N_A / (pi M)).
///
/// `molar_mass` in kg/mol, result in m/s.
pub fn mean_thermal_speed(gas_temperature: f64, molar_mass: f64) -> f64 {
    ((8.0 * K_B * gas_temperature * N_A) / (PI * molar_mass)).sqrt()
}

/// Incident flux of A onto the wall: 0.25 * v_mean * A0.
pub fn incident_flux(gas_temperature: f64, molar_mass: f64, initial_a: f64) -> f64 {
    0.25 * mean_thermal_speed(gas_temperature, molar_mass) * initial_a
}

/// `prefactor * exp(-E / (N_A k_B T_w))`, with `E` in J/mol.
pub fn arrhenius(prefactor: f64, activation_energy: f64, wall_temperature: f64) -> f64 {
    prefactor * (-activation_energy / (N_A * K_B * wall_temperature)).exp()
}
