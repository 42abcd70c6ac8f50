//! In-memory storage implementation.
//!
//! Backs the REST surface and the tests. Collections are handed out as
//! fresh snapshots; nothing holds a reference into the store, which keeps
//! the immutable-snapshot-per-computation contract of the domain layer.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use shared::{Payment, Project, Task};

use super::traits::{PaymentStorage, ProjectStorage, TaskStorage};

/// Process-local store keyed by entity id.
#[derive(Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, Project>>,
    tasks: RwLock<HashMap<String, Task>>,
    payments: RwLock<HashMap<String, Payment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStorage for MemoryStore {
    fn store_project(&self, project: &Project) -> Result<()> {
        self.projects
            .write()
            .unwrap()
            .insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        Ok(self.projects.read().unwrap().get(project_id).cloned())
    }

    fn list_projects(&self, archived: Option<bool>) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .unwrap()
            .values()
            .filter(|project| archived.map_or(true, |flag| project.is_archived == flag))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> Result<()> {
        self.projects
            .write()
            .unwrap()
            .insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn delete_project(&self, project_id: &str) -> Result<bool> {
        Ok(self.projects.write().unwrap().remove(project_id).is_some())
    }
}

impl TaskStorage for MemoryStore {
    fn store_task(&self, task: &Task) -> Result<()> {
        self.tasks
            .write()
            .unwrap()
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self.tasks.read().unwrap().get(task_id).cloned())
    }

    fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .unwrap()
            .values()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(tasks)
    }

    fn list_all_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.tasks.read().unwrap().values().cloned().collect();
        tasks.sort_by(|a, b| {
            a.end_date
                .cmp(&b.end_date)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        self.tasks
            .write()
            .unwrap()
            .insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn delete_task(&self, task_id: &str) -> Result<bool> {
        Ok(self.tasks.write().unwrap().remove(task_id).is_some())
    }
}

impl PaymentStorage for MemoryStore {
    fn store_payment(&self, payment: &Payment) -> Result<()> {
        self.payments
            .write()
            .unwrap()
            .insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    fn get_payment(&self, payment_id: &str) -> Result<Option<Payment>> {
        Ok(self.payments.read().unwrap().get(payment_id).cloned())
    }

    fn list_payments(&self, project_id: &str) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .unwrap()
            .values()
            .filter(|payment| payment.project_id == project_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.event_date
                .cmp(&a.event_date)
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(payments)
    }

    fn list_all_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.payments.read().unwrap().values().cloned().collect())
    }

    fn update_payment(&self, payment: &Payment) -> Result<()> {
        self.payments
            .write()
            .unwrap()
            .insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    fn delete_payment(&self, payment_id: &str) -> Result<bool> {
        Ok(self.payments.write().unwrap().remove(payment_id).is_some())
    }
}
