//! Promotion Registry

use thiserror::Error;

use crate::promotions::Promotion;

/// Errors raised when changing the active promotion set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A promotion with this id is already registered.
    #[error("promotion {0} is already registered")]
    DuplicateId(String),

    /// No promotion with this id is registered.
    #[error("promotion {0} is not registered")]
    NotFound(String),
}

/// The active promotion set, kept in insertion order.
///
/// Insertion order is what breaks ties between promotions of equal priority.
#[derive(Debug, Clone, Default)]
pub struct PromotionRegistry {
    promotions: Vec<Promotion>,
}

impl PromotionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from promotions, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if two promotions share an id.
    pub fn with_promotions(
        promotions: impl IntoIterator<Item = Promotion>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        for promotion in promotions {
            registry.add(promotion)?;
        }

        Ok(registry)
    }

    /// Append a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the id is already registered.
    pub fn add(&mut self, promotion: Promotion) -> Result<(), RegistryError> {
        if self.contains(&promotion.id) {
            return Err(RegistryError::DuplicateId(promotion.id));
        }

        self.promotions.push(promotion);

        Ok(())
    }

    /// Replace the promotion with the same id, keeping its position.
    ///
    /// Returns the previous version.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no promotion has that id.
    pub fn replace(&mut self, promotion: Promotion) -> Result<Promotion, RegistryError> {
        match self.promotions.iter_mut().find(|p| p.id == promotion.id) {
            Some(slot) => Ok(std::mem::replace(slot, promotion)),
            None => Err(RegistryError::NotFound(promotion.id)),
        }
    }

    /// Remove a promotion by id, returning it if it was registered.
    pub fn remove(&mut self, id: &str) -> Option<Promotion> {
        let pos = self.promotions.iter().position(|p| p.id == id)?;

        Some(self.promotions.remove(pos))
    }

    /// Get a promotion by id.
    pub fn get(&self, id: &str) -> Option<&Promotion> {
        self.promotions.iter().find(|p| p.id == id)
    }

    /// Check whether a promotion id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All promotions, in insertion order.
    pub fn as_slice(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Iterate over promotions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Promotion> {
        self.promotions.iter()
    }

    /// Get the number of registered promotions.
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Check if no promotions are registered.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }
}
