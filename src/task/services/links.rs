//! Link operations on [`TaskService`].

use super::{TaskService, TaskServiceError, TaskServiceResult};
use crate::error::MissingEntity;
use crate::extension::ports::ExtensionResolver;
use crate::identity::User;
use crate::permission::Action;
use crate::schema::{
    domain::{LinkType, LinkTypeId},
    ports::SchemaRegistry,
};
use crate::task::{
    domain::{Link, LinkId, TaskEvent, TaskId},
    ports::TaskRepository,
};
use mockable::Clock;
use tracing::info;

impl<S, R, X, C> TaskService<S, R, X, C>
where
    S: SchemaRegistry,
    R: TaskRepository,
    X: ExtensionResolver,
    C: Clock + Send + Sync,
{
    /// Links `src_task_id` to `dest_task_id` and records `LINK_CREATED` on
    /// the source task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::PermissionDenied`] without write access to
    /// the source task, [`TaskServiceError::Domain`] for a self-link and
    /// [`TaskServiceError::Repository`] when the same link already exists.
    pub async fn create_link(
        &self,
        link_type_id: LinkTypeId,
        src_task_id: TaskId,
        dest_task_id: TaskId,
        user: &User,
    ) -> TaskServiceResult<Link> {
        let link_type = self.lookup.link_type(link_type_id).await?;
        let (src, schema) = self.load(src_task_id).await?;
        self.gate.check(user, &schema, Action::Write)?;
        self.require_task(dest_task_id).await?;

        let link = Link::new(link_type_id, src_task_id, dest_task_id, &*self.clock)?;
        let event = TaskEvent::link_created(&link, &link_type, user.id(), &*self.clock);
        self.tasks.insert_link(&link, &event).await?;
        info!(
            link_id = %link.id(),
            src = %src.key(),
            dest_task_id = %dest_task_id,
            relation = link_type.src_name(),
            "tasks linked"
        );

        self.dispatcher
            .dispatch(&schema, &src, std::slice::from_ref(&event), user)
            .await;
        Ok(link)
    }

    /// Removes a link and records `LINK_DELETED` on its source task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for an unknown link and
    /// [`TaskServiceError::PermissionDenied`] without write access to the
    /// source task.
    pub async fn delete_link(&self, link_id: LinkId, user: &User) -> TaskServiceResult<()> {
        let link = self
            .tasks
            .find_link(link_id)
            .await?
            .ok_or(TaskServiceError::NotFound(MissingEntity::Link(link_id)))?;
        let link_type = self.lookup.link_type(link.link_type_id()).await?;
        let (src, schema) = self.load(link.src_task_id()).await?;
        self.gate.check(user, &schema, Action::Write)?;

        let event = TaskEvent::link_deleted(&link, &link_type, user.id(), &*self.clock);
        self.tasks.delete_link(link_id, &event).await?;
        info!(link_id = %link_id, src = %src.key(), "link removed");

        self.dispatcher
            .dispatch(&schema, &src, std::slice::from_ref(&event), user)
            .await;
        Ok(())
    }

    /// Returns every link type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Schema`] when the registry fails.
    pub async fn list_link_types(&self) -> TaskServiceResult<Vec<LinkType>> {
        Ok(self.lookup.link_types().await?)
    }
}
