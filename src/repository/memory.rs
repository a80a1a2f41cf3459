//! In-process implementation of [`Repository`].
//!
//! Honors the same contract as the PostgreSQL repository (ordering, filtering, slug
//! uniqueness, full-collection replacement, cascade on delete) so the HTTP layer can be
//! exercised without a database. Everything lives behind one `RwLock`, which makes each
//! mutation atomic.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    CollaborationFilter, JournalFilter, MemberFilter, NewsFilter, ProjectFilter, ProjectScope,
    RepoResult, Repository, RepositoryError, blank_to_null, distinct_names,
};
use crate::{
    models::{
        Certification, Collaboration, CreateCollaborationRequest, CreateJournalRequest,
        CreateMemberRequest, CreateNewsRequest, CreateProjectRequest, Created,
        DEFAULT_COLLABORATION_TYPE, DEFAULT_JOURNAL_TYPE, DEFAULT_NEWS_CATEGORY,
        DEFAULT_PROJECT_STATUS, Education, EducationInput, Experience, ExperienceInput, Journal,
        JournalSummary, Member, MemberDetail, MemberSpecialist, News, NewsSummary, Project,
        ProjectCategory, ProjectMember, Skill, Social, SocialInput, SpecialistName,
        UpdateCollaborationRequest, UpdateJournalRequest, UpdateMemberRequest, UpdateNewsRequest,
        UpdateProjectRequest, join_authors,
    },
    pagination::Pagination,
};

#[derive(Default)]
struct Store {
    next_id: i64,
    members: Vec<MemberDetail>,
    news: Vec<News>,
    journals: Vec<Journal>,
    projects: Vec<Project>,
    categories: Vec<ProjectCategory>,
    collaborations: Vec<Collaboration>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// MemoryRepository
///
/// Selected with `DATA_BACKEND=memory`. Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the project category lookup, which has no write endpoint.
    pub async fn with_categories(self, categories: Vec<ProjectCategory>) -> Self {
        self.store.write().await.categories = categories;
        self
    }
}

// --- Matching Helpers ---

/// Case-insensitive substring match over any of the given columns. NULL never matches.
fn matches_query(q: Option<&str>, columns: &[Option<&str>]) -> bool {
    let Some(q) = q else { return true };
    let needle = q.to_lowercase();
    columns
        .iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&needle))
}

fn matches_eq<T: PartialEq + ?Sized>(filter: Option<&T>, value: Option<&T>) -> bool {
    match filter {
        Some(wanted) => value == Some(wanted),
        None => true,
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: Pagination) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let data = items
        .into_iter()
        .skip(page.offset().max(0) as usize)
        .take(page.limit().max(0) as usize)
        .collect();
    (data, total)
}

/// `DESC NULLS LAST` ordering for optional sort keys.
fn desc_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// --- Member Children ---

fn build_specialists(names: &[String]) -> Vec<MemberSpecialist> {
    let mut names = distinct_names(names);
    names.sort();
    names
        .into_iter()
        .map(|name| MemberSpecialist {
            spec: SpecialistName { name },
        })
        .collect()
}

fn build_skills(names: &[String]) -> Vec<Skill> {
    distinct_names(names)
        .into_iter()
        .map(|skill_name| Skill { skill_name })
        .collect()
}

fn build_experiences(store: &mut Store, items: &[ExperienceInput]) -> Vec<Experience> {
    items
        .iter()
        .map(|item| Experience {
            id: store.next_id(),
            role: Some(item.role.clone()),
            org: blank_to_null(&item.org),
            period: blank_to_null(&item.period),
            bullets: item.bullets.clone(),
        })
        .collect()
}

fn build_educations(store: &mut Store, items: &[EducationInput]) -> Vec<Education> {
    items
        .iter()
        .map(|item| Education {
            id: store.next_id(),
            degree: Some(item.degree.clone()),
            org: Some(item.org.clone()),
            year: blank_to_null(&item.year),
            note: blank_to_null(&item.note),
        })
        .collect()
}

fn build_certifications(store: &mut Store, names: &[String]) -> Vec<Certification> {
    names
        .iter()
        .filter_map(|name| blank_to_null(name))
        .map(|cert_name| Certification {
            id: store.next_id(),
            cert_name: Some(cert_name),
        })
        .collect()
}

fn build_socials(store: &mut Store, items: &[SocialInput]) -> Vec<Social> {
    items
        .iter()
        .map(|item| Social {
            id: store.next_id(),
            kind: item.kind.as_str().to_string(),
            url: item.url.clone(),
        })
        .collect()
}

fn build_team(team: &[ProjectMember]) -> Vec<ProjectMember> {
    team.iter()
        .map(|member| ProjectMember {
            member_slug: member.member_slug.trim().to_string(),
            role: member.role.as_deref().and_then(blank_to_null),
        })
        .collect()
}

/// Applies a PATCH value to a field when the key was present.
fn apply<T>(target: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(value) = value {
        *target = value.clone();
    }
}

/// List views never carry the project team.
fn without_team(project: &Project) -> Project {
    Project {
        team_members: None,
        ..project.clone()
    }
}

fn remove_by_slug<T>(items: &mut Vec<T>, slug: &str, slug_of: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| slug_of(item) != slug);
    items.len() != before
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_members(
        &self,
        filter: &MemberFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Member>, i64)> {
        let store = self.store.read().await;
        let mut items: Vec<Member> = store
            .members
            .iter()
            .map(|detail| &detail.member)
            .filter(|m| matches_query(filter.q.as_deref(), &[Some(m.name.as_str()), m.email.as_deref()]))
            .filter(|m| matches_eq(filter.position.as_deref(), m.position.as_deref()))
            .filter(|m| matches_eq(filter.faculty.as_deref(), m.faculty.as_deref()))
            .filter(|m| matches_eq(filter.program.as_deref(), m.program.as_deref()))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(items, page))
    }

    async fn get_member(&self, slug: &str) -> RepoResult<Option<MemberDetail>> {
        let store = self.store.read().await;
        Ok(store.members.iter().find(|d| d.member.slug == slug).cloned())
    }

    async fn create_member(&self, req: &CreateMemberRequest) -> RepoResult<Created> {
        let mut store = self.store.write().await;
        if store.members.iter().any(|d| d.member.slug == req.slug) {
            return Err(RepositoryError::slug_taken("member", &req.slug));
        }

        let now = Utc::now();
        let id = store.next_id();
        let experiences = build_experiences(&mut store, &req.experiences);
        let educations = build_educations(&mut store, &req.educations);
        let certifications = build_certifications(&mut store, &req.certifications);
        let socials = build_socials(&mut store, &req.socials);

        store.members.push(MemberDetail {
            member: Member {
                id,
                slug: req.slug.clone(),
                name: req.name.clone(),
                title: req.title.clone(),
                position: req.position.clone(),
                faculty: req.faculty.clone(),
                program: req.program.clone(),
                email: req.email.clone(),
                avatar_url: req.avatar_url.clone(),
                bio: req.bio.clone(),
                created_at: now,
                updated_at: now,
            },
            member_specialists: build_specialists(&req.specialists),
            skills: build_skills(&req.skills),
            experiences,
            educations,
            certifications,
            socials,
        });

        Ok(Created {
            id,
            slug: req.slug.clone(),
        })
    }

    async fn update_member(&self, slug: &str, req: &UpdateMemberRequest) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let Some(index) = store.members.iter().position(|d| d.member.slug == slug) else {
            return Ok(false);
        };
        if req.is_empty() {
            return Ok(true);
        }

        let experiences = req
            .experiences
            .as_ref()
            .map(|items| build_experiences(&mut store, items));
        let educations = req
            .educations
            .as_ref()
            .map(|items| build_educations(&mut store, items));
        let certifications = req
            .certifications
            .as_ref()
            .map(|names| build_certifications(&mut store, names));
        let socials = req
            .socials
            .as_ref()
            .map(|items| build_socials(&mut store, items));

        let detail = &mut store.members[index];
        let member = &mut detail.member;
        apply(&mut member.name, &req.name);
        apply(&mut member.title, &req.title);
        apply(&mut member.position, &req.position);
        apply(&mut member.faculty, &req.faculty);
        apply(&mut member.program, &req.program);
        apply(&mut member.email, &req.email);
        apply(&mut member.avatar_url, &req.avatar_url);
        apply(&mut member.bio, &req.bio);
        member.updated_at = Utc::now();

        if let Some(names) = &req.specialists {
            detail.member_specialists = build_specialists(names);
        }
        if let Some(names) = &req.skills {
            detail.skills = build_skills(names);
        }
        apply(&mut detail.experiences, &experiences);
        apply(&mut detail.educations, &educations);
        apply(&mut detail.certifications, &certifications);
        apply(&mut detail.socials, &socials);

        Ok(true)
    }

    async fn delete_member(&self, slug: &str) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(remove_by_slug(&mut store.members, slug, |d| d.member.slug.as_str()))
    }

    async fn list_news(
        &self,
        filter: &NewsFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<NewsSummary>, i64)> {
        let store = self.store.read().await;
        let mut items: Vec<&News> = store
            .news
            .iter()
            .filter(|n| matches_query(filter.q.as_deref(), &[Some(n.title.as_str()), n.excerpt.as_deref()]))
            .filter(|n| matches_eq(filter.category.as_deref(), Some(n.category.as_str())))
            .collect();
        items.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let summaries = items.into_iter().map(NewsSummary::from).collect();
        Ok(paginate(summaries, page))
    }

    async fn get_news(&self, slug: &str) -> RepoResult<Option<News>> {
        let store = self.store.read().await;
        Ok(store.news.iter().find(|n| n.slug == slug).cloned())
    }

    async fn create_news(&self, slug: &str, req: &CreateNewsRequest) -> RepoResult<Created> {
        let mut store = self.store.write().await;
        if store.news.iter().any(|n| n.slug == slug) {
            return Err(RepositoryError::slug_taken("news", slug));
        }

        let now = Utc::now();
        let id = store.next_id();
        store.news.push(News {
            id,
            slug: slug.to_string(),
            title: req.title.clone(),
            excerpt: req.excerpt.clone(),
            content: req.content.clone(),
            image_url: req.image_url.clone(),
            category: req
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_NEWS_CATEGORY.to_string()),
            published_at: req.published_at.unwrap_or(now),
            created_at: now,
        });

        Ok(Created {
            id,
            slug: slug.to_string(),
        })
    }

    async fn update_news(&self, slug: &str, req: &UpdateNewsRequest) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let Some(news) = store.news.iter_mut().find(|n| n.slug == slug) else {
            return Ok(false);
        };

        apply(&mut news.title, &req.title);
        apply(&mut news.excerpt, &req.excerpt);
        apply(&mut news.content, &req.content);
        apply(&mut news.image_url, &req.image_url);
        apply(&mut news.category, &req.category);
        apply(&mut news.published_at, &req.published_at);
        Ok(true)
    }

    async fn delete_news(&self, slug: &str) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(remove_by_slug(&mut store.news, slug, |n| n.slug.as_str()))
    }

    async fn list_journals(
        &self,
        filter: &JournalFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<JournalSummary>, i64)> {
        let store = self.store.read().await;
        let mut items: Vec<&Journal> = store
            .journals
            .iter()
            .filter(|j| {
                matches_query(
                    filter.q.as_deref(),
                    &[
                        Some(j.title.as_str()),
                        j.abstract_text.as_deref(),
                        Some(j.authors_text.as_str()),
                    ],
                )
            })
            .filter(|j| matches_eq(filter.year.as_ref(), j.year.as_ref()))
            .filter(|j| matches_eq(filter.kind.as_deref(), Some(j.kind.as_str())))
            .collect();
        items.sort_by(|a, b| desc_nulls_last(a.year, b.year).then_with(|| b.id.cmp(&a.id)));
        let summaries = items.into_iter().map(JournalSummary::from).collect();
        Ok(paginate(summaries, page))
    }

    async fn get_journal(&self, slug: &str) -> RepoResult<Option<Journal>> {
        let store = self.store.read().await;
        Ok(store.journals.iter().find(|j| j.slug == slug).cloned())
    }

    async fn create_journal(&self, slug: &str, req: &CreateJournalRequest) -> RepoResult<Created> {
        let mut store = self.store.write().await;
        if store.journals.iter().any(|j| j.slug == slug) {
            return Err(RepositoryError::slug_taken("journal", slug));
        }

        let id = store.next_id();
        store.journals.push(Journal {
            id,
            slug: slug.to_string(),
            title: req.title.clone(),
            authors_text: join_authors(&req.authors),
            authors_json: Some(req.authors.clone()),
            venue: req.venue.clone(),
            year: req.year,
            kind: req
                .kind
                .clone()
                .unwrap_or_else(|| DEFAULT_JOURNAL_TYPE.to_string()),
            doi: req.doi.clone(),
            pdf_url: req.pdf_url.clone(),
            thumb_url: req.thumb_url.clone(),
            abstract_text: req.abstract_text.clone(),
            keywords_json: Some(req.keywords.clone()),
            created_at: Utc::now(),
        });

        Ok(Created {
            id,
            slug: slug.to_string(),
        })
    }

    async fn update_journal(&self, slug: &str, req: &UpdateJournalRequest) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let Some(journal) = store.journals.iter_mut().find(|j| j.slug == slug) else {
            return Ok(false);
        };

        apply(&mut journal.title, &req.title);
        if let Some(authors) = &req.authors {
            journal.authors_text = join_authors(authors);
            journal.authors_json = Some(authors.clone());
        }
        apply(&mut journal.venue, &req.venue);
        apply(&mut journal.year, &req.year);
        apply(&mut journal.kind, &req.kind);
        apply(&mut journal.doi, &req.doi);
        apply(&mut journal.pdf_url, &req.pdf_url);
        apply(&mut journal.thumb_url, &req.thumb_url);
        apply(&mut journal.abstract_text, &req.abstract_text);
        if let Some(keywords) = &req.keywords {
            journal.keywords_json = Some(keywords.clone());
        }
        Ok(true)
    }

    async fn delete_journal(&self, slug: &str) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(remove_by_slug(&mut store.journals, slug, |j| j.slug.as_str()))
    }

    async fn list_projects(
        &self,
        filter: &ProjectFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Project>, i64)> {
        let store = self.store.read().await;
        let mut items: Vec<&Project> = store
            .projects
            .iter()
            .filter(|p| filter.scope == ProjectScope::Admin || p.is_published)
            .filter(|p| !filter.featured_only || p.is_featured)
            .filter(|p| {
                matches_query(
                    filter.q.as_deref(),
                    &[Some(p.title.as_str()), p.short_description.as_deref()],
                )
            })
            .filter(|p| matches_eq(filter.category.as_deref(), p.category.as_deref()))
            .filter(|p| matches_eq(filter.status.as_deref(), Some(p.status.as_str())))
            .filter(|p| matches_eq(filter.year.as_ref(), p.year.as_ref()))
            .collect();

        match filter.scope {
            ProjectScope::Public => items.sort_by(|a, b| {
                b.is_featured
                    .cmp(&a.is_featured)
                    .then_with(|| a.display_order.cmp(&b.display_order))
                    .then_with(|| desc_nulls_last(a.project_date, b.project_date))
                    .then_with(|| a.id.cmp(&b.id))
            }),
            ProjectScope::Admin => items.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
        }

        let projects = items.into_iter().map(without_team).collect();
        Ok(paginate(projects, page))
    }

    async fn featured_projects(&self, limit: i64) -> RepoResult<Vec<Project>> {
        let store = self.store.read().await;
        let mut items: Vec<&Project> = store
            .projects
            .iter()
            .filter(|p| p.is_featured && p.is_published)
            .collect();
        items.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items
            .into_iter()
            .take(limit.max(0) as usize)
            .map(without_team)
            .collect())
    }

    async fn project_categories(&self) -> RepoResult<Vec<ProjectCategory>> {
        let store = self.store.read().await;
        let mut items = store.categories.clone();
        items.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    async fn get_project(&self, slug: &str, published_only: bool) -> RepoResult<Option<Project>> {
        let store = self.store.read().await;
        Ok(store
            .projects
            .iter()
            .find(|p| p.slug == slug && (!published_only || p.is_published))
            .cloned())
    }

    async fn create_project(&self, slug: &str, req: &CreateProjectRequest) -> RepoResult<Project> {
        let mut store = self.store.write().await;
        if store.projects.iter().any(|p| p.slug == slug) {
            return Err(RepositoryError::slug_taken("project", slug));
        }

        let now = Utc::now();
        let project = Project {
            id: store.next_id(),
            slug: slug.to_string(),
            title: req.title.clone(),
            category: req.category.clone(),
            status: req
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.to_string()),
            thumbnail_url: req.thumbnail_url.clone(),
            banner_url: req.banner_url.clone(),
            qr_code_url: req.qr_code_url.clone(),
            short_description: req.short_description.clone(),
            full_description: req.full_description.clone(),
            demo_url: req.demo_url.clone(),
            repo_url: req.repo_url.clone(),
            paper_url: req.paper_url.clone(),
            video_url: req.video_url.clone(),
            metadata: req.metadata.clone().unwrap_or_default(),
            gallery: req.gallery.clone().unwrap_or_default(),
            features: req.features.clone().unwrap_or_default(),
            tags: req.tags.clone().unwrap_or_default(),
            content_blocks: req.content_blocks.clone().unwrap_or_default(),
            project_date: req.project_date,
            year: req.year,
            is_featured: req.is_featured.unwrap_or(false),
            is_published: req.is_published.unwrap_or(true),
            display_order: req.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
            team_members: Some(build_team(&req.team_members)),
        };
        store.projects.push(project.clone());

        Ok(project)
    }

    async fn update_project(
        &self,
        slug: &str,
        req: &UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        let mut store = self.store.write().await;
        let Some(project) = store.projects.iter_mut().find(|p| p.slug == slug) else {
            return Ok(None);
        };
        if req.is_empty() {
            return Ok(Some(project.clone()));
        }

        apply(&mut project.title, &req.title);
        apply(&mut project.category, &req.category);
        apply(&mut project.status, &req.status);
        apply(&mut project.thumbnail_url, &req.thumbnail_url);
        apply(&mut project.banner_url, &req.banner_url);
        apply(&mut project.qr_code_url, &req.qr_code_url);
        apply(&mut project.short_description, &req.short_description);
        apply(&mut project.full_description, &req.full_description);
        apply(&mut project.demo_url, &req.demo_url);
        apply(&mut project.repo_url, &req.repo_url);
        apply(&mut project.paper_url, &req.paper_url);
        apply(&mut project.video_url, &req.video_url);
        apply(&mut project.metadata, &req.metadata);
        apply(&mut project.gallery, &req.gallery);
        apply(&mut project.features, &req.features);
        apply(&mut project.tags, &req.tags);
        apply(&mut project.content_blocks, &req.content_blocks);
        apply(&mut project.project_date, &req.project_date);
        apply(&mut project.year, &req.year);
        apply(&mut project.is_featured, &req.is_featured);
        apply(&mut project.is_published, &req.is_published);
        apply(&mut project.display_order, &req.display_order);
        if let Some(team) = &req.team_members {
            project.team_members = Some(build_team(team));
        }
        project.updated_at = Utc::now();

        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, slug: &str) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(remove_by_slug(&mut store.projects, slug, |p| p.slug.as_str()))
    }

    async fn list_collaborations(
        &self,
        filter: &CollaborationFilter,
        page: Pagination,
    ) -> RepoResult<(Vec<Collaboration>, i64)> {
        let store = self.store.read().await;
        let mut items: Vec<Collaboration> = store
            .collaborations
            .iter()
            .filter(|c| {
                matches_query(filter.q.as_deref(), &[Some(c.name.as_str()), c.organization.as_deref()])
            })
            .filter(|c| matches_eq(filter.kind.as_deref(), Some(c.kind.as_str())))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(items, page))
    }

    async fn all_collaborations(&self) -> RepoResult<Vec<Collaboration>> {
        let store = self.store.read().await;
        let mut items = store.collaborations.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn get_collaboration(&self, slug: &str) -> RepoResult<Option<Collaboration>> {
        let store = self.store.read().await;
        Ok(store.collaborations.iter().find(|c| c.slug == slug).cloned())
    }

    async fn create_collaboration(
        &self,
        slug: &str,
        req: &CreateCollaborationRequest,
    ) -> RepoResult<Created> {
        let mut store = self.store.write().await;
        if store.collaborations.iter().any(|c| c.slug == slug) {
            return Err(RepositoryError::slug_taken("collaboration", slug));
        }

        let id = store.next_id();
        store.collaborations.push(Collaboration {
            id,
            slug: slug.to_string(),
            name: req.name.clone(),
            organization: req.organization.clone(),
            kind: req
                .kind
                .clone()
                .unwrap_or_else(|| DEFAULT_COLLABORATION_TYPE.to_string()),
            country: req.country.clone(),
            logo_url: req.logo_url.clone(),
            description: req.description.clone(),
            link: req.link.clone(),
            created_at: Utc::now(),
        });

        Ok(Created {
            id,
            slug: slug.to_string(),
        })
    }

    async fn update_collaboration(
        &self,
        slug: &str,
        req: &UpdateCollaborationRequest,
    ) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let Some(item) = store.collaborations.iter_mut().find(|c| c.slug == slug) else {
            return Ok(false);
        };

        apply(&mut item.name, &req.name);
        apply(&mut item.organization, &req.organization);
        apply(&mut item.kind, &req.kind);
        apply(&mut item.country, &req.country);
        apply(&mut item.logo_url, &req.logo_url);
        apply(&mut item.description, &req.description);
        apply(&mut item.link, &req.link);
        Ok(true)
    }

    async fn delete_collaboration(&self, slug: &str) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        Ok(remove_by_slug(&mut store.collaborations, slug, |c| c.slug.as_str()))
    }
}
