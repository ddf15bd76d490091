//! Ordered probes for fields that can come from several places.

/// Run probes in order and return the first value found.
///
/// ```rust
/// use product_extraction::extractors::probe::first_found;
///
/// let meta: Option<&str> = None;
/// let heading = Some("Desk Lamp");
/// let name = first_found(&[&|| meta, &|| heading]);
/// assert_eq!(name, Some("Desk Lamp"));
/// ```
pub fn first_found<T>(probes: &[&dyn Fn() -> Option<T>]) -> Option<T> {
    probes.iter().find_map(|probe| probe())
}
