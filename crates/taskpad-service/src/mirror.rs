//! Client-side copy of the task list.
//!
//! `TaskMirror` keeps what a screen shows in step with the server. It never
//! pre-commits: local state changes only after the service call (and any
//! follow-up reads it needs) succeeded, so a failure leaves the list exactly
//! as it was and the message in `last_error`.

use std::collections::HashMap;

use taskpad_core::task::{CreateTask, ReplaceTask, Task};

use crate::{ImageUpload, ServiceError, TaskService};

#[derive(Debug, Clone, PartialEq)]
struct CachedUrl {
    reference: String,
    url: Option<String>,
}

pub struct TaskMirror<S: TaskService> {
    service: S,
    /// Most recent first.
    tasks: Vec<Task>,
    image_urls: HashMap<i64, CachedUrl>,
    last_error: Option<String>,
}

impl<S: TaskService> TaskMirror<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            tasks: Vec::new(),
            image_urls: HashMap::new(),
            last_error: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Cached image URL, if the task has an image and it has been resolved
    /// for the task's current reference.
    pub fn image_url(&self, id: i64) -> Option<&str> {
        let reference = self.task(id)?.image_reference.as_deref()?;
        let cached = self.image_urls.get(&id)?;
        if cached.reference == reference {
            cached.url.as_deref()
        } else {
            None
        }
    }

    fn track<T>(&mut self, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => self.last_error = Some(e.to_string()),
        }
        result
    }

    /// Resolve URLs for every task whose image changed since it was cached.
    async fn resolve_stale(&self, tasks: &[Task]) -> Result<HashMap<i64, CachedUrl>, ServiceError> {
        let mut urls = HashMap::new();
        for task in tasks {
            let Some(reference) = &task.image_reference else {
                continue;
            };
            match self.image_urls.get(&task.id) {
                Some(cached) if &cached.reference == reference => {
                    urls.insert(task.id, cached.clone());
                }
                _ => {
                    let url = self.service.resolve_attachment_url(task.id).await?;
                    urls.insert(
                        task.id,
                        CachedUrl {
                            reference: reference.clone(),
                            url,
                        },
                    );
                }
            }
        }
        Ok(urls)
    }

    /// Fetch the whole list and resolve image URLs that are not cached yet.
    pub async fn load(&mut self) -> Result<(), ServiceError> {
        let result = self.fetch_all().await;
        let (tasks, urls) = self.track(result)?;
        self.tasks = tasks;
        self.image_urls = urls;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<(Vec<Task>, HashMap<i64, CachedUrl>), ServiceError> {
        let mut tasks = self.service.list_tasks().await?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let urls = self.resolve_stale(&tasks).await?;
        Ok((tasks, urls))
    }

    pub async fn create(&mut self, input: &CreateTask) -> Result<Task, ServiceError> {
        let result = self.service.create_task(input).await;
        let task = self.track(result)?;
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Full replace of a task; the returned record is swapped in by id.
    pub async fn update(&mut self, id: i64, input: &ReplaceTask) -> Result<Task, ServiceError> {
        let result = self.replace_and_resolve(id, input).await;
        let (task, urls) = self.track(result)?;
        self.swap_in(task.clone(), urls);
        Ok(task)
    }

    async fn replace_and_resolve(
        &self,
        id: i64,
        input: &ReplaceTask,
    ) -> Result<(Task, HashMap<i64, CachedUrl>), ServiceError> {
        let task = self.service.update_task(id, input).await?;
        let urls = self.resolve_stale(std::slice::from_ref(&task)).await?;
        Ok((task, urls))
    }

    fn swap_in(&mut self, task: Task, mut urls: HashMap<i64, CachedUrl>) {
        let id = task.id;
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(slot) => *slot = task,
            None => self.tasks.insert(0, task),
        }
        match urls.remove(&id) {
            Some(cached) => {
                self.image_urls.insert(id, cached);
            }
            None => {
                self.image_urls.remove(&id);
            }
        }
    }

    /// Rebuild the full record from the last known copy, let `change` adjust
    /// it, and send it as a replace.
    pub async fn edit<F>(&mut self, id: i64, change: F) -> Result<Task, ServiceError>
    where
        F: FnOnce(&mut ReplaceTask),
    {
        let Some(current) = self.task(id) else {
            let result = Err(ServiceError::NotFound(format!("task {id} is not loaded")));
            return self.track(result);
        };
        let mut draft = current.to_replace();
        change(&mut draft);
        self.update(id, &draft).await
    }

    pub async fn toggle_completed(&mut self, id: i64) -> Result<Task, ServiceError> {
        self.edit(id, |draft| draft.is_completed = !draft.is_completed).await
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), ServiceError> {
        let result = self.service.delete_task(id).await;
        self.track(result)?;
        self.tasks.retain(|t| t.id != id);
        self.image_urls.remove(&id);
        Ok(())
    }

    /// Upload an image, then re-read the task and its URL.
    pub async fn upload_image(
        &mut self,
        id: i64,
        upload: ImageUpload,
    ) -> Result<Task, ServiceError> {
        let result = self.upload_and_reload(id, upload).await;
        let (task, urls) = self.track(result)?;
        self.swap_in(task.clone(), urls);
        Ok(task)
    }

    async fn upload_and_reload(
        &self,
        id: i64,
        upload: ImageUpload,
    ) -> Result<(Task, HashMap<i64, CachedUrl>), ServiceError> {
        self.service.upload_attachment(id, upload).await?;
        let task = self.service.get_task(id).await?;
        let urls = self.resolve_stale(std::slice::from_ref(&task)).await?;
        Ok((task, urls))
    }

    /// Ask the service again for a task's image URL, ignoring the cache.
    pub async fn refresh_image_url(&mut self, id: i64) -> Result<Option<String>, ServiceError> {
        let result = self.service.resolve_attachment_url(id).await;
        let url = self.track(result)?;
        match self.task(id).and_then(|t| t.image_reference.clone()) {
            Some(reference) => {
                self.image_urls.insert(
                    id,
                    CachedUrl {
                        reference,
                        url: url.clone(),
                    },
                );
            }
            None => {
                self.image_urls.remove(&id);
            }
        }
        Ok(url)
    }
}
