//! Kinetic operator
//!
//! Builds the kinetic (mass) matrix of an entity in generalized coordinates:
//!
//! ```text
//! K(q) = Σ_axis J_axis · diag(m) · J_axisᵗ
//! T(q, q̇) = ½ q̇ᵗ K(q) q̇
//! ```
//!
//! where `J_axis` is the N×M Jacobian of the element coordinates along one
//! spatial axis. All scratch matrices come from the shared
//! [`ResourceManager`].

use crate::error::{ensure_len, MechanicsError, Result, ResultExt};
use crate::physics::{Entity, GeneralizedCoordinates};
use crate::resources::ResourceManager;
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

/// Kinetic operator of an entity
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use lagrange_rs::models::LinearEntity;
/// use lagrange_rs::physics::{GeneralizedCoordinates, KineticOperator};
/// use lagrange_rs::resources::ResourceManager;
/// use nalgebra::DVector;
///
/// // Two unit masses, each moving along x with one coordinate
/// let entity = Arc::new(LinearEntity::axis_aligned(DVector::from_vec(vec![1.0, 1.0]))?);
/// let coords = Arc::new(GeneralizedCoordinates::uniform(2, 0.0, -1.0, 1.0, 1e-6, 1e-3));
/// let kinetic = KineticOperator::new(coords, entity, Arc::new(ResourceManager::new()))?;
///
/// let q = DVector::from_vec(vec![0.0, 0.0]);
/// let qp = DVector::from_vec(vec![1.0, 0.0]);
/// assert!((kinetic.compute_kinetic_energy(&q, &qp)? - 0.5).abs() < 1e-12);
/// # Ok::<(), lagrange_rs::error::MechanicsError>(())
/// ```
pub struct KineticOperator {
    coordinates: Arc<GeneralizedCoordinates>,
    entity: Arc<dyn Entity>,
    resources: Arc<ResourceManager>,
}

impl KineticOperator {
    /// Create the operator
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the entity's dof count differs from the number
    /// of coordinates, or when its mass vector does not hold one mass per
    /// element.
    pub fn new(
        coordinates: Arc<GeneralizedCoordinates>,
        entity: Arc<dyn Entity>,
        resources: Arc<ResourceManager>,
    ) -> Result<Self> {
        ensure_len("KineticOperator::new (dofs)", entity.no_of_dofs(), coordinates.len())?;
        ensure_len(
            "KineticOperator::new (masses)",
            entity.no_of_elements(),
            entity.masses().len(),
        )?;

        if let Some(m) = entity.masses().iter().find(|m| !(m.is_finite() && **m >= 0.0)) {
            return Err(MechanicsError::invalid_config(format!(
                "entity '{}' has an invalid mass {}",
                entity.name(),
                m
            )));
        }

        Ok(Self {
            coordinates,
            entity,
            resources,
        })
    }

    /// Number of degrees of freedom N
    pub fn no_of_dofs(&self) -> usize {
        self.entity.no_of_dofs()
    }

    /// Entity described by this operator
    pub fn entity(&self) -> &Arc<dyn Entity> {
        &self.entity
    }

    /// Coordinates whose `dqs` are used as Jacobian steps
    pub fn coordinates(&self) -> &Arc<GeneralizedCoordinates> {
        &self.coordinates
    }

    /// Buffer pool used by this operator
    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    /// Compute K(q) into `kmat` using Jacobian step `dq`
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `q` and `dq` differ in length, when they do not
    /// match the entity, or when `kmat` is not N×N. Entity failures are
    /// propagated with context.
    pub fn compute_kinetic_matrix(
        &self,
        q: &DVector<f64>,
        dq: &DVector<f64>,
        kmat: &mut DMatrix<f64>,
    ) -> Result<()> {
        const OP: &str = "KineticOperator::compute_kinetic_matrix";

        ensure_len(OP, q.len(), dq.len())?;

        let n = self.entity.no_of_dofs();
        let m = self.entity.no_of_elements();
        ensure_len(OP, n, q.len())?;
        ensure_len(OP, n, kmat.nrows())?;
        ensure_len(OP, n, kmat.ncols())?;

        let mut jac_x = self.resources.request_matrix(n, m);
        let mut jac_y = self.resources.request_matrix(n, m);
        let mut jac_z = self.resources.request_matrix(n, m);

        self.entity
            .compute_jacobian(q, dq, &mut jac_x, &mut jac_y, &mut jac_z)
            .context(OP)?;

        let masses = self.entity.masses();
        kmat.fill(0.0);

        for jac in [&*jac_x, &*jac_y, &*jac_z] {
            for i in 0..n {
                for j in i..n {
                    let mut sum = 0.0;
                    for e in 0..m {
                        sum += masses[e] * jac[(i, e)] * jac[(j, e)];
                    }
                    kmat[(i, j)] += sum;
                }
            }
        }

        // Mirror the upper triangle
        for i in 0..n {
            for j in 0..i {
                kmat[(i, j)] = kmat[(j, i)];
            }
        }

        Ok(())
    }

    /// Kinetic energy T = ½ q̇ᵗ K(q) q̇
    ///
    /// The Jacobian is evaluated with the coordinates' `dqs` steps.
    pub fn compute_kinetic_energy(&self, q: &DVector<f64>, qp: &DVector<f64>) -> Result<f64> {
        const OP: &str = "KineticOperator::compute_kinetic_energy";

        let n = self.entity.no_of_dofs();
        ensure_len(OP, n, qp.len())?;

        let mut kmat = self.resources.request_matrix(n, n);
        self.compute_kinetic_matrix(q, self.coordinates.dqs(), &mut kmat)
            .context(OP)?;

        let mut kqp = self.resources.request_vector(n);
        kqp.gemv(1.0, &*kmat, qp, 0.0);

        Ok(0.5 * qp.dot(&*kqp))
    }

    /// Owned kinetic matrix at `q`
    pub fn kinetic_matrix(&self, q: &DVector<f64>) -> Result<DMatrix<f64>> {
        let n = self.entity.no_of_dofs();
        let mut kmat = DMatrix::zeros(n, n);
        self.compute_kinetic_matrix(q, self.coordinates.dqs(), &mut kmat)?;
        Ok(kmat)
    }
}

impl std::fmt::Debug for KineticOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KineticOperator")
            .field("entity", &self.entity.name())
            .field("dofs", &self.entity.no_of_dofs())
            .field("elements", &self.entity.no_of_elements())
            .finish()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
