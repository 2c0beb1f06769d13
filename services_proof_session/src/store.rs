//! Theory document persistence
//!
//! A theory is a JSON document holding an ordered list of items. Theorem
//! items carry the proof state the editor loads and saves; every other
//! field is passed through untouched.

use crate::error::StoreError;
use proof_editor_core::StepRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Item type tag of a theorem
pub const THEOREM_TY: &str = "thm";

/// Theory document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theory {
    pub name: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: Vec<TheoryItem>,
}

impl Theory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            description: String::new(),
            content: Vec::new(),
        }
    }

    pub fn item(&self, name: &str) -> Option<&TheoryItem> {
        self.content.iter().find(|item| item.name == name)
    }

    pub fn item_mut(&mut self, name: &str) -> Option<&mut TheoryItem> {
        self.content.iter_mut().find(|item| item.name == name)
    }
}

/// One entry of a theory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryItem {
    pub ty: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Vec<StepRecord>>,
    /// Unfinished obligations in the saved proof
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_gaps: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TheoryItem {
    pub fn theorem(name: impl Into<String>, prop: impl Into<String>) -> Self {
        Self {
            ty: THEOREM_TY.to_string(),
            name: name.into(),
            vars: BTreeMap::new(),
            prop: Some(prop.into()),
            proof: None,
            num_gaps: None,
            instructions: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.vars.insert(name.into(), ty.into());
        self
    }

    pub fn with_proof(mut self, proof: Vec<StepRecord>) -> Self {
        self.proof = Some(proof);
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn is_theorem(&self) -> bool {
        self.ty == THEOREM_TY
    }
}

/// What a proof tab needs to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofItem {
    pub vars: BTreeMap<String, String>,
    pub prop: String,
    pub proof: Option<Vec<StepRecord>>,
    pub instructions: Vec<String>,
}

/// Theory document store
pub trait TheoryStore {
    fn load_theory(&self, name: &str) -> Result<Theory, StoreError>;

    fn save_theory(&mut self, theory: &Theory) -> Result<(), StoreError>;

    /// Load the proof state of a theorem item
    fn load_proof(&self, theory: &str, item: &str) -> Result<ProofItem, StoreError> {
        let doc = self.load_theory(theory)?;
        let entry = doc.item(item).ok_or_else(|| StoreError::ItemNotFound {
            theory: theory.to_string(),
            item: item.to_string(),
        })?;
        if !entry.is_theorem() {
            return Err(StoreError::NotATheorem(item.to_string()));
        }
        Ok(ProofItem {
            vars: entry.vars.clone(),
            prop: entry.prop.clone().unwrap_or_default(),
            proof: entry.proof.clone(),
            instructions: entry.instructions.clone(),
        })
    }

    /// Store a committed proof under a theorem item
    fn save_proof(
        &mut self,
        theory: &str,
        item: &str,
        proof: &[StepRecord],
        num_gaps: usize,
    ) -> Result<(), StoreError> {
        let mut doc = self.load_theory(theory)?;
        let entry = doc.item_mut(item).ok_or_else(|| StoreError::ItemNotFound {
            theory: theory.to_string(),
            item: item.to_string(),
        })?;
        if !entry.is_theorem() {
            return Err(StoreError::NotATheorem(item.to_string()));
        }
        entry.proof = Some(proof.to_vec());
        entry.num_gaps = Some(num_gaps);
        self.save_theory(&doc)?;
        tracing::info!(theory, item, steps = proof.len(), num_gaps, "proof saved");
        Ok(())
    }
}

/// In-memory store for tests and scripted runs
#[derive(Debug, Default)]
pub struct MemoryTheoryStore {
    theories: BTreeMap<String, Theory>,
}

impl MemoryTheoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theory(mut self, theory: Theory) -> Self {
        self.theories.insert(theory.name.clone(), theory);
        self
    }
}

impl TheoryStore for MemoryTheoryStore {
    fn load_theory(&self, name: &str) -> Result<Theory, StoreError> {
        self.theories
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::TheoryNotFound(name.to_string()))
    }

    fn save_theory(&mut self, theory: &Theory) -> Result<(), StoreError> {
        self.theories.insert(theory.name.clone(), theory.clone());
        Ok(())
    }
}

/// Directory of `<name>.json` theory files
#[derive(Debug, Clone)]
pub struct JsonFileTheoryStore {
    root: PathBuf,
}

impl JsonFileTheoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    /// Load a theory from an explicit file path
    pub fn load_file(path: &Path) -> Result<Theory, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl TheoryStore for JsonFileTheoryStore {
    fn load_theory(&self, name: &str) -> Result<Theory, StoreError> {
        let path = self.path_for(name);
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::TheoryNotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save_theory(&mut self, theory: &Theory) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(theory)?;
        std::fs::write(self.path_for(&theory.name), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theory() -> Theory {
        let mut theory = Theory::new("logic_base");
        theory.content.push(
            TheoryItem::theorem("conj_comm", "A & B --> B & A")
                .with_var("A", "bool")
                .with_var("B", "bool")
                .with_instructions(vec!["intro".into(), "apply conjI".into()]),
        );
        theory
    }

    #[test]
    fn test_load_proof_without_saved_steps() {
        let store = MemoryTheoryStore::new().with_theory(theory());
        let item = store.load_proof("logic_base", "conj_comm").unwrap();
        assert_eq!(item.prop, "A & B --> B & A");
        assert_eq!(item.vars.len(), 2);
        assert!(item.proof.is_none());
        assert_eq!(item.instructions.len(), 2);
    }

    #[test]
    fn test_missing_item() {
        let store = MemoryTheoryStore::new().with_theory(theory());
        assert!(matches!(
            store.load_proof("logic_base", "nope"),
            Err(StoreError::ItemNotFound { .. })
        ));
        assert!(matches!(
            store.load_proof("other", "conj_comm"),
            Err(StoreError::TheoryNotFound(_))
        ));
    }

    #[test]
    fn test_non_theorem_item_rejected() {
        let mut doc = theory();
        let mut def = TheoryItem::theorem("nat", "");
        def.ty = "type.ind".into();
        doc.content.push(def);
        let store = MemoryTheoryStore::new().with_theory(doc);
        assert!(matches!(
            store.load_proof("logic_base", "nat"),
            Err(StoreError::NotATheorem(_))
        ));
    }

    #[test]
    fn test_save_proof_records_gaps() {
        let mut store = MemoryTheoryStore::new().with_theory(theory());
        let proof = vec![StepRecord::new("0", "B & A", "sorry")];
        store.save_proof("logic_base", "conj_comm", &proof, 1).unwrap();

        let doc = store.load_theory("logic_base").unwrap();
        let item = doc.item("conj_comm").unwrap();
        assert_eq!(item.proof.as_deref(), Some(proof.as_slice()));
        assert_eq!(item.num_gaps, Some(1));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r#"{
            "name": "logic_base",
            "content": [
                {"ty": "def.ax", "name": "conj", "T": "bool => bool => bool"}
            ]
        }"#;
        let doc: Theory = serde_json::from_str(json).unwrap();
        let item = doc.item("conj").unwrap();
        assert_eq!(item.extra.get("T").and_then(|v| v.as_str()), Some("bool => bool => bool"));

        let back = serde_json::to_string(&doc).unwrap();
        assert!(back.contains("\"T\":\"bool => bool => bool\""));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileTheoryStore::new(dir.path());
        store.save_theory(&theory()).unwrap();

        assert!(dir.path().join("logic_base.json").exists());
        assert_eq!(store.load_theory("logic_base").unwrap(), theory());
        assert!(matches!(
            store.load_theory("missing"),
            Err(StoreError::TheoryNotFound(_))
        ));
    }
}
